//! Setting-key enums whose members carry their storage aliases.

use crate::attrs::Described;
use std::fmt;

/// An enum of well-known settings. Each member's [`Alias`](crate::attrs::Alias)
/// is the name the setting is stored under.
pub trait SettingKey: Described + Copy + fmt::Debug + Send + Sync {
    /// The member name as declared, e.g. `PulseInterval`.
    fn member_name(&self) -> &'static str;
}

/// Declare a [`SettingKey`] enum together with its registration table.
///
/// ```
/// typed_settings::setting_keys! {
///     pub enum Setting {
///         PulseInterval => "PULSE_INTERVAL",
///         MailTo => "MAIL_TO",
///         Unmapped,
///     }
/// }
///
/// use typed_settings::config::SettingKey;
/// assert_eq!(Setting::MailTo.member_name(), "MailTo");
/// ```
#[macro_export]
macro_rules! setting_keys {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident $(=> $alias:literal)? ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant, )*
        }

        impl $crate::attrs::Described for $name {
            fn members() -> ::std::vec::Vec<$crate::attrs::MemberDescriptor> {
                ::std::vec![$(
                    {
                        let member = $crate::attrs::MemberDescriptor::new(stringify!($variant));
                        $( let member = member.with($crate::attrs::Alias::new($alias)); )?
                        member
                    },
                )*]
            }
        }

        impl $crate::config::SettingKey for $name {
            fn member_name(&self) -> &'static str {
                match self {
                    $( $name::$variant => stringify!($variant), )*
                }
            }
        }
    };
}
