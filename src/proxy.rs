use crate::{
    codec::ValueCodec,
    descriptor::{capitalized, MethodDescriptor, ServiceDescriptor},
    endpoint::EndpointMapper,
    error::{CallError, CallResult, TransportError},
    net::{client::HttpTransport, Outcome, RequestEnvelope},
    types::{Arguments, Type},
};
use futures::ready;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::{
    collections::BTreeMap,
    fmt,
    future::Future,
    marker::PhantomData,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};
use tokio::{runtime::RuntimeFlavor, sync::oneshot};
use tracing::debug;

/// One callable stub per interface method, keyed by wire method name.
pub struct Proxy {
    descriptor: ServiceDescriptor,
    stubs: BTreeMap<String, MethodStub>,
}

impl Proxy {
    pub(crate) fn build(
        descriptor: ServiceDescriptor,
        mapper: &EndpointMapper,
        transport: &Arc<HttpTransport>,
        codec: &Arc<dyn ValueCodec>,
    ) -> Self {
        let stubs = descriptor
            .methods()
            .iter()
            .map(|method| {
                let wire_name = method.wire_name();
                let url = transport.url(&mapper.path(descriptor.name(), &wire_name));
                debug!(
                    service = descriptor.name(),
                    method = %wire_name,
                    %url,
                    is_async = method.is_async(),
                    "built stub"
                );
                let stub = MethodStub {
                    method: method.clone(),
                    url,
                    transport: Arc::clone(transport),
                    codec: Arc::clone(codec),
                };
                (wire_name, stub)
            })
            .collect();
        Self { descriptor, stubs }
    }

    pub fn descriptor(&self) -> &ServiceDescriptor {
        &self.descriptor
    }

    /// Wire method names, in sorted order.
    pub fn methods(&self) -> impl Iterator<Item = &str> {
        self.stubs.keys().map(String::as_str)
    }

    /// Looks a stub up by declared or wire method name.
    pub fn stub(&self, method: &str) -> CallResult<&MethodStub> {
        self.stubs
            .get(&capitalized(method))
            .ok_or_else(|| CallError::UnknownMethod(method.to_owned()))
    }

    pub fn call<R>(&self, method: &str, args: impl Arguments) -> CallResult<R>
    where
        R: DeserializeOwned,
    {
        self.stub(method)?.call(args)
    }

    pub fn call_async<R>(&self, method: &str, args: impl Arguments) -> PendingCall<R>
    where
        R: DeserializeOwned,
    {
        match self.stub(method) {
            Ok(stub) => stub.call_async(args),
            Err(e) => PendingCall::failed(e),
        }
    }
}

impl fmt::Debug for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Proxy")
            .field("service", &self.descriptor.name())
            .field("stubs", &self.stubs)
            .finish()
    }
}

/// Performs the remote call for one method.
///
/// The URL is fixed when the stub is built.
pub struct MethodStub {
    method: MethodDescriptor,
    url: String,
    transport: Arc<HttpTransport>,
    codec: Arc<dyn ValueCodec>,
}

impl MethodStub {
    pub fn descriptor(&self) -> &MethodDescriptor {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn mode(is_async: bool) -> &'static str {
        if is_async {
            "non-blocking"
        } else {
            "blocking"
        }
    }

    fn require_mode(&self, is_async: bool) -> CallResult<()> {
        if self.method.is_async() == is_async {
            return Ok(());
        }
        Err(CallError::DispatchMode {
            method: self.method.wire_name(),
            actual: Self::mode(self.method.is_async()),
            requested: Self::mode(is_async),
        })
    }

    fn encode_args(&self, args: impl Arguments) -> CallResult<Vec<Value>> {
        let values = args.into_values().map_err(CallError::Serialize)?;
        let params = self.method.params();
        if values.len() != params.len() {
            return Err(CallError::Arity {
                method: self.method.wire_name(),
                expected: params.len(),
                given: values.len(),
            });
        }
        values
            .into_iter()
            .zip(params)
            .enumerate()
            .map(|(position, (value, declared))| {
                self.codec
                    .encode(value, declared)
                    .map_err(|mismatch| CallError::Argument {
                        method: self.method.wire_name(),
                        position,
                        mismatch,
                    })
            })
            .collect()
    }

    /// Blocking call: returns once the response has been decoded.
    ///
    /// Inside a multi-thread tokio runtime the worker is handed over with
    /// `block_in_place`. A current-thread runtime can't give up its only
    /// worker, so there the call fails with [`CallError::BlockingInRuntime`].
    pub fn call<R>(&self, args: impl Arguments) -> CallResult<R>
    where
        R: DeserializeOwned,
    {
        self.require_mode(false)?;
        let envelope = RequestEnvelope::positional(self.encode_args(args)?);
        let body = envelope.to_body().map_err(CallError::Serialize)?;
        let raw = match tokio::runtime::Handle::try_current() {
            Err(_) => self.transport.post_blocking(&self.url, body)?,
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| self.transport.post_blocking(&self.url, body))?
            }
            Ok(_) => {
                return Err(CallError::BlockingInRuntime {
                    method: self.method.wire_name(),
                })
            }
        };
        let value = Outcome::from_response(raw.status, &raw.status_text, &raw.body)
            .map_err(CallError::Decode)?
            .into_result()?;
        let value = decode_return(self.codec.as_ref(), self.method.returns(), value)?;
        serde_json::from_value(value).map_err(CallError::Decode)
    }

    /// Non-blocking call: the request is sent on a spawned task and the
    /// returned future resolves once. Dropping it does not cancel the request.
    pub fn call_async<R>(&self, args: impl Arguments) -> PendingCall<R>
    where
        R: DeserializeOwned,
    {
        let prepared = self.require_mode(true).and_then(|()| {
            let envelope = RequestEnvelope::tagged(self.encode_args(args)?);
            envelope.to_body().map_err(CallError::Serialize)
        });
        let body = match prepared {
            Ok(body) => body,
            Err(e) => return PendingCall::failed(e),
        };
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                return PendingCall::failed(TransportError::connection(e.to_string()).into())
            }
        };

        let (tx, rx) = oneshot::channel();
        let url = self.url.clone();
        let transport = Arc::clone(&self.transport);
        let codec = Arc::clone(&self.codec);
        let returns = self.method.returns().clone();
        handle.spawn(async move {
            let result: CallResult<Value> = async {
                let raw = transport.post(&url, body).await?;
                let value = Outcome::from_response(raw.status, &raw.status_text, &raw.body)
                    .map_err(CallError::Decode)?
                    .into_result()?;
                decode_return(codec.as_ref(), &returns, value)
            }
            .await;
            // The caller may have dropped the PendingCall; nothing to do then.
            _ = tx.send(result);
        });
        PendingCall::waiting(rx)
    }
}

impl fmt::Debug for MethodStub {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("MethodStub")
            .field("method", &self.method)
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

fn decode_return(codec: &dyn ValueCodec, returns: &Type, value: Value) -> CallResult<Value> {
    codec.decode(value, returns).map_err(CallError::Return)
}

/// The result of a non-blocking call, resolved exactly once.
#[must_use = "a PendingCall does nothing for the caller unless awaited"]
pub struct PendingCall<R> {
    state: PendingState,
    _marker: PhantomData<fn() -> R>,
}

enum PendingState {
    Failed(Option<CallError>),
    Waiting(oneshot::Receiver<CallResult<Value>>),
}

impl<R> PendingCall<R> {
    fn failed(err: CallError) -> Self {
        Self {
            state: PendingState::Failed(Some(err)),
            _marker: PhantomData,
        }
    }

    fn waiting(rx: oneshot::Receiver<CallResult<Value>>) -> Self {
        Self {
            state: PendingState::Waiting(rx),
            _marker: PhantomData,
        }
    }
}

impl<R> Future for PendingCall<R>
where
    R: DeserializeOwned,
{
    type Output = CallResult<R>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let result = match &mut this.state {
            PendingState::Failed(err) => Err(err.take().unwrap_or_else(|| {
                TransportError::connection("call already completed").into()
            })),
            PendingState::Waiting(rx) => match ready!(Pin::new(rx).poll(cx)) {
                Ok(result) => result,
                Err(_) => Err(TransportError::connection("request task ended early").into()),
            },
        };
        Poll::Ready(
            result.and_then(|value| serde_json::from_value(value).map_err(CallError::Decode)),
        )
    }
}

impl<R> fmt::Debug for PendingCall<R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let state = match self.state {
            PendingState::Failed(_) => "failed",
            PendingState::Waiting(_) => "waiting",
        };
        f.debug_struct("PendingCall").field("state", &state).finish()
    }
}
