//! Client proxies for service interfaces shared with an HTTP server.
//!
//! Declare an interface with [`service!`], resolve it through a
//! [`ProxyRegistry`], and call its methods like local ones. Each call POSTs
//! the JSON-encoded arguments to `<base>/<Service>/<Method>` and decodes the
//! result, a remote exception, or a transport failure.
//!
//! ```no_run
//! use rpcbridge::{service, ProxyRegistry};
//!
//! service! {
//!     pub trait Greeter {
//!         fn hello(name: String) -> String;
//!         async fn helloLater(name: String) -> String;
//!     }
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = ProxyRegistry::new("http://127.0.0.1:8080")?;
//! let greeter: Greeter = registry.resolve()?;
//! let later = greeter.helloLater("world".into()).await?;
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod descriptor;
pub mod endpoint;
pub mod error;
mod macros;
pub mod net;
pub mod proxy;
pub mod registry;
pub mod types;

pub use codec::{JsonCodec, ValueCodec};
pub use descriptor::{capitalized, Interface, MethodDescriptor, ServiceDescriptor};
pub use endpoint::EndpointMapper;
pub use error::{ApplicationError, CallError, CallResult, ConfigurationError, TransportError};
pub use proxy::{MethodStub, PendingCall, Proxy};
pub use registry::{ProxyRegistry, RegistryBuilder};
pub use types::{Arguments, Type, TypeMismatch, Typed};
