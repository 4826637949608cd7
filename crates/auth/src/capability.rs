use core::ops::BitOr;

use serde::{Deserialize, Serialize};

/// One of the four actions a module permission can grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Read,
    Write,
    Edit,
    Delete,
}

impl Capability {
    pub const ALL: [Capability; 4] = [
        Capability::Read,
        Capability::Write,
        Capability::Edit,
        Capability::Delete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Capability::Read => "read",
            Capability::Write => "write",
            Capability::Edit => "edit",
            Capability::Delete => "delete",
        }
    }
}

impl core::fmt::Display for Capability {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The read/write/edit/delete flag set stored on a module permission.
///
/// Flags are independent: holding one never implies another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Capabilities {
    pub read: bool,
    pub write: bool,
    pub edit: bool,
    pub delete: bool,
}

impl Capabilities {
    pub const NONE: Capabilities = Capabilities {
        read: false,
        write: false,
        edit: false,
        delete: false,
    };

    pub const ALL: Capabilities = Capabilities {
        read: true,
        write: true,
        edit: true,
        delete: true,
    };

    pub const fn only(capability: Capability) -> Self {
        Self::NONE.with(capability)
    }

    pub const fn with(self, capability: Capability) -> Self {
        match capability {
            Capability::Read => Self { read: true, ..self },
            Capability::Write => Self { write: true, ..self },
            Capability::Edit => Self { edit: true, ..self },
            Capability::Delete => Self { delete: true, ..self },
        }
    }

    pub fn contains(self, capability: Capability) -> bool {
        match capability {
            Capability::Read => self.read,
            Capability::Write => self.write,
            Capability::Edit => self.edit,
            Capability::Delete => self.delete,
        }
    }

    /// True iff every flag set in `required` is also set here.
    pub fn contains_all(self, required: Capabilities) -> bool {
        required.iter().all(|c| self.contains(c))
    }

    pub fn union(self, other: Capabilities) -> Self {
        Self {
            read: self.read || other.read,
            write: self.write || other.write,
            edit: self.edit || other.edit,
            delete: self.delete || other.delete,
        }
    }

    /// Flags in `required` that are not set here.
    pub fn missing(self, required: Capabilities) -> Capabilities {
        required
            .iter()
            .filter(|c| !self.contains(*c))
            .fold(Capabilities::NONE, Capabilities::with)
    }

    pub fn is_empty(self) -> bool {
        self == Self::NONE
    }

    pub fn iter(self) -> impl Iterator<Item = Capability> {
        Capability::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

impl From<Capability> for Capabilities {
    fn from(value: Capability) -> Self {
        Capabilities::only(value)
    }
}

impl BitOr for Capabilities {
    type Output = Capabilities;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl BitOr for Capability {
    type Output = Capabilities;

    fn bitor(self, rhs: Self) -> Self::Output {
        Capabilities::only(self).with(rhs)
    }
}

impl core::fmt::Display for Capabilities {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let names: Vec<&str> = self.iter().map(Capability::as_str).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn caps() -> impl Strategy<Value = Capabilities> {
        (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
            |(read, write, edit, delete)| Capabilities {
                read,
                write,
                edit,
                delete,
            },
        )
    }

    #[test]
    fn single_flag_does_not_imply_others() {
        let edit = Capabilities::only(Capability::Edit);
        assert!(edit.contains(Capability::Edit));
        assert!(!edit.contains(Capability::Read));
        assert!(!edit.contains(Capability::Write));
        assert!(!edit.contains(Capability::Delete));
    }

    #[test]
    fn missing_lists_unset_required_flags() {
        let held = Capability::Read | Capability::Edit;
        let required = Capability::Edit | Capability::Delete;
        assert_eq!(held.missing(required), Capabilities::only(Capability::Delete));
        assert_eq!(held.to_string(), "[read, edit]");
    }

    proptest! {
        #[test]
        fn union_contains_both_operands(a in caps(), b in caps()) {
            let u = a | b;
            prop_assert!(u.contains_all(a));
            prop_assert!(u.contains_all(b));
            prop_assert_eq!(u, b | a);
        }

        #[test]
        fn union_adds_no_flag_absent_from_both(a in caps(), b in caps()) {
            let u = a | b;
            for c in Capability::ALL {
                prop_assert_eq!(u.contains(c), a.contains(c) || b.contains(c));
            }
        }

        #[test]
        fn missing_is_empty_exactly_when_contained(a in caps(), b in caps()) {
            prop_assert_eq!(a.missing(b).is_empty(), a.contains_all(b));
        }
    }
}
