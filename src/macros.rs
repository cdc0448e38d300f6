/// Declares a shared service interface and generates its client.
///
/// ```ignore
/// rpcbridge::service! {
///     /// Users, as seen from the client.
///     pub trait UserService {
///         fn getUser(id: i64) -> User;
///         async fn findUsers(name: String, limit: i64) -> Vec<User>;
///     }
/// }
///
/// let users: UserService = registry.resolve()?;
/// let user = users.getUser(7)?;                         // POST /UserService/GetUser
/// let found = users.findUsers("al".into(), 10).await?;  // POST /UserService/FindUsers
/// ```
///
/// `fn` methods block the calling thread and return
/// [`CallResult`](crate::CallResult); `async fn` methods return a
/// [`PendingCall`](crate::PendingCall). A blocking method called from async
/// code needs a multi-thread runtime. A method without `-> T` returns `()`. Every parameter and return type must
/// implement [`Typed`](crate::Typed) and the serde traits. The cache key is the
/// interface's module path plus its name.
#[macro_export]
macro_rules! service {
    (@munch $head:tt [$($done:tt)*]
        $(#[$mm:meta])*
        async fn $method:ident ( $($arg:ident : $argty:ty),* $(,)? ) -> $ret:ty ;
        $($rest:tt)*
    ) => {
        $crate::service!(@munch $head
            [$($done)* [[$(#[$mm])*] nonblocking $method ($($arg : $argty),*) -> $ret]]
            $($rest)*);
    };
    (@munch $head:tt [$($done:tt)*]
        $(#[$mm:meta])*
        fn $method:ident ( $($arg:ident : $argty:ty),* $(,)? ) -> $ret:ty ;
        $($rest:tt)*
    ) => {
        $crate::service!(@munch $head
            [$($done)* [[$(#[$mm])*] blocking $method ($($arg : $argty),*) -> $ret]]
            $($rest)*);
    };
    (@munch $head:tt [$($done:tt)*]
        $(#[$mm:meta])*
        async fn $method:ident ( $($arg:ident : $argty:ty),* $(,)? ) ;
        $($rest:tt)*
    ) => {
        $crate::service!(@munch $head
            [$($done)* [[$(#[$mm])*] nonblocking $method ($($arg : $argty),*) -> ()]]
            $($rest)*);
    };
    (@munch $head:tt [$($done:tt)*]
        $(#[$mm:meta])*
        fn $method:ident ( $($arg:ident : $argty:ty),* $(,)? ) ;
        $($rest:tt)*
    ) => {
        $crate::service!(@munch $head
            [$($done)* [[$(#[$mm])*] blocking $method ($($arg : $argty),*) -> ()]]
            $($rest)*);
    };
    (@munch [$(#[$meta:meta])* $vis:vis $name:ident]
        [$([[$(#[$mm:meta])*] $mode:ident $method:ident ($($arg:ident : $argty:ty),*) -> $ret:ty])*]
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug)]
        $vis struct $name {
            proxy: ::std::sync::Arc<$crate::Proxy>,
        }

        impl $crate::Interface for $name {
            const KEY: &'static str = concat!(module_path!(), "::", stringify!($name));

            fn descriptor() -> $crate::ServiceDescriptor {
                $crate::ServiceDescriptor::new(stringify!($name), Self::KEY)
                $(.method($crate::service!(@descriptor $mode $method ($($argty),*) -> $ret)))*
            }

            fn from_proxy(proxy: ::std::sync::Arc<$crate::Proxy>) -> Self {
                Self { proxy }
            }

            fn proxy(&self) -> &::std::sync::Arc<$crate::Proxy> {
                &self.proxy
            }
        }

        impl $name {
            $(
                $crate::service!(@method [$(#[$mm])*] $mode $method ($($arg : $argty),*) -> $ret);
            )*
        }
    };
    (@descriptor blocking $method:ident ($($argty:ty),*) -> $ret:ty) => {
        $crate::MethodDescriptor::new(
            stringify!($method),
            ::std::vec::Vec::<$crate::Type>::from([$(<$argty as $crate::Typed>::rpc_type()),*]),
            <$ret as $crate::Typed>::rpc_type(),
        )
    };
    (@descriptor nonblocking $method:ident ($($argty:ty),*) -> $ret:ty) => {
        $crate::MethodDescriptor::new(
            stringify!($method),
            ::std::vec::Vec::<$crate::Type>::from([$(<$argty as $crate::Typed>::rpc_type()),*]),
            $crate::Type::async_of(<$ret as $crate::Typed>::rpc_type()),
        )
    };
    (@method [$(#[$mm:meta])*] blocking $method:ident ($($arg:ident : $argty:ty),*) -> $ret:ty) => {
        $(#[$mm])*
        #[allow(non_snake_case)]
        pub fn $method(&self, $($arg: $argty),*) -> $crate::CallResult<$ret> {
            self.proxy.call(stringify!($method), ($($arg,)*))
        }
    };
    (@method [$(#[$mm:meta])*] nonblocking $method:ident ($($arg:ident : $argty:ty),*) -> $ret:ty) => {
        $(#[$mm])*
        #[allow(non_snake_case)]
        pub fn $method(&self, $($arg: $argty),*) -> $crate::PendingCall<$ret> {
            self.proxy.call_async(stringify!($method), ($($arg,)*))
        }
    };
    (
        $(#[$meta:meta])*
        $vis:vis trait $name:ident {
            $($body:tt)*
        }
    ) => {
        $crate::service!(@munch [$(#[$meta])* $vis $name] [] $($body)*);
    };
}
