//! Declarative macro for configuration structures.

/// Declare a configuration structure and implement [`Settings`](crate::Settings) for it.
///
/// The struct is emitted exactly as written, attributes included, so serde
/// attributes keep driving the file decoder. Each field may carry one of:
///
/// - `=> { env: "A,B", env_default: "1", env_separator: ";", env_required: true, flag: "name" }`
///   for a leaf field (any subset of keys, in any order);
/// - `=> nested` or `=> nested { env_prefix: "DB_" }` for a nested structure;
/// - nothing, in which case the field is only read from the configuration file.
///
/// A field marked `#[serde(skip)]` is reset to its `Default` whenever a file is
/// read, since the file layer rebuilds the structure through serde.
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use tierconf::settings;
///
/// settings! {
///     #[derive(Debug, Default, Serialize, Deserialize)]
///     pub struct Database {
///         pub host: String => { env: "HOST", env_default: "localhost" },
///         pub port: u16 => { env: "PORT", env_default: "5432", flag: "db-port" },
///     }
/// }
///
/// settings! {
///     #[derive(Debug, Default, Serialize, Deserialize)]
///     pub struct Config {
///         pub name: String => { env: "APP_NAME", env_required: true },
///         pub database: Database => nested { env_prefix: "DB_" },
///         #[serde(rename = "tags")]
///         pub labels: Vec<String>,
///     }
/// }
/// ```
#[macro_export]
macro_rules! settings {
    // Nested structure
    (@munch [$($meta:tt)*] [$vis:vis] $name:ident [$($fields:tt)*] [$($entries:tt)*]
        $(#[$fmeta:meta])*
        $fvis:vis $fname:ident : $fty:ty => nested $({ $($nkey:ident : $nval:expr),* $(,)? })?
        $(, $($rest:tt)*)?
    ) => {
        $crate::settings!(@munch [$($meta)*] [$vis] $name
            [$($fields)* $(#[$fmeta])* $fvis $fname: $fty,]
            [$($entries)* (nested $fname $($(.$nkey($nval))*)?)]
            $($($rest)*)?
        );
    };

    // Leaf field with tags
    (@munch [$($meta:tt)*] [$vis:vis] $name:ident [$($fields:tt)*] [$($entries:tt)*]
        $(#[$fmeta:meta])*
        $fvis:vis $fname:ident : $fty:ty => { $($key:ident : $val:expr),* $(,)? }
        $(, $($rest:tt)*)?
    ) => {
        $crate::settings!(@munch [$($meta)*] [$vis] $name
            [$($fields)* $(#[$fmeta])* $fvis $fname: $fty,]
            [$($entries)* (leaf $fname $(.$key($val))*)]
            $($($rest)*)?
        );
    };

    // Plain field, not described
    (@munch [$($meta:tt)*] [$vis:vis] $name:ident [$($fields:tt)*] [$($entries:tt)*]
        $(#[$fmeta:meta])*
        $fvis:vis $fname:ident : $fty:ty
        $(, $($rest:tt)*)?
    ) => {
        $crate::settings!(@munch [$($meta)*] [$vis] $name
            [$($fields)* $(#[$fmeta])* $fvis $fname: $fty,]
            [$($entries)*]
            $($($rest)*)?
        );
    };

    (@munch [$($meta:tt)*] [$vis:vis] $name:ident [$($fields:tt)*] [$($entry:tt)*]) => {
        $($meta)*
        $vis struct $name {
            $($fields)*
        }

        impl $crate::Settings for $name {
            fn fields(&mut self) -> $crate::Result<::std::vec::Vec<$crate::Field<'_>>> {
                ::std::result::Result::Ok(::std::vec![
                    $($crate::settings!(@field self $entry)),*
                ])
            }
        }
    };

    (@field $this:ident (leaf $fname:ident $($tags:tt)*)) => {
        $crate::Field::leaf(
            ::std::stringify!($fname),
            $crate::Tags::new() $($tags)*,
            &mut $this.$fname,
        )
    };

    (@field $this:ident (nested $fname:ident $($tags:tt)*)) => {
        $crate::Field::nested(::std::stringify!($fname), &mut $this.$fname) $($tags)*
    };

    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $($body:tt)*
        }
    ) => {
        $crate::settings!(@munch [$(#[$meta])*] [$vis] $name [] [] $($body)*);
    };
}
