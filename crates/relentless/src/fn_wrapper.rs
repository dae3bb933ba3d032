// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

/// Generates a named, clonable wrapper around a user-supplied `Fn`.
///
/// Hooks and custom backoff functions are stored in an `Arc<dyn Fn ...>` so the
/// configuration that owns them stays `Clone`, `Send` and `Sync`.
///
/// ```rust,ignore
/// define_fn_wrapper!(LogHook(Fn(record: &AttemptRecord)));
/// define_fn_wrapper!(BackoffFn(Fn(attempt: u32) -> Duration));
/// ```
///
/// The generated type exposes `new(f)`, `call(args...)` and implements `Clone` and `Debug`.
macro_rules! define_fn_wrapper {
    ($(#[$meta:meta])* $name:ident(Fn($($param_name:ident: $param_ty:ty),*) -> $return_ty:ty)) => {
        $(#[$meta])*
        #[derive(Clone)]
        pub(crate) struct $name(std::sync::Arc<dyn Fn($($param_ty),*) -> $return_ty + Send + Sync>);

        impl $name {
            pub(crate) fn new<F>(f: F) -> Self
            where
                F: Fn($($param_ty),*) -> $return_ty + Send + Sync + 'static,
            {
                Self(std::sync::Arc::new(f))
            }

            pub(crate) fn call(&self, $($param_name: $param_ty),*) -> $return_ty {
                (self.0)($($param_name),*)
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(stringify!($name)).finish_non_exhaustive()
            }
        }
    };

    ($(#[$meta:meta])* $name:ident(Fn($($param_name:ident: $param_ty:ty),*))) => {
        $crate::define_fn_wrapper!($(#[$meta])* $name(Fn($($param_name: $param_ty),*) -> ()));
    };
}

pub(crate) use define_fn_wrapper;
