//! Module families: the declared base type of a composition root.
//!
//! A family is an abstract grouping of module types. Families form a tree
//! rooted at [`ModuleFamily::ROOT`]; a control declares one family and
//! accepts every concrete module whose own family is that family or any
//! descendant of it.

use std::fmt;

/// A named, abstract base for module types.
///
/// ```
/// use modkit_runtime::ModuleFamily;
///
/// static SAMPLE: ModuleFamily = ModuleFamily::new("Sample", &ModuleFamily::ROOT);
/// static SAMPLE_MOTION: ModuleFamily = ModuleFamily::new("SampleMotion", &SAMPLE);
///
/// assert!(SAMPLE_MOTION.derives_from(&SAMPLE));
/// assert!(SAMPLE_MOTION.derives_from(&ModuleFamily::ROOT));
/// assert!(!SAMPLE.derives_from(&SAMPLE_MOTION));
/// ```
#[derive(Clone, Copy)]
pub struct ModuleFamily {
    name: &'static str,
    parent: Option<&'static ModuleFamily>,
}

impl ModuleFamily {
    /// The family every module belongs to.
    pub const ROOT: ModuleFamily = ModuleFamily {
        name: "Module",
        parent: None,
    };

    /// A family deriving from `parent`.
    pub const fn new(name: &'static str, parent: &'static ModuleFamily) -> Self {
        Self {
            name,
            parent: Some(parent),
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub const fn parent(&self) -> Option<&'static ModuleFamily> {
        self.parent
    }

    /// `true` when `self` is `base` or a transitive descendant of it.
    ///
    /// Families are compared by name; two families sharing a name are the
    /// same family.
    pub fn derives_from(&self, base: &ModuleFamily) -> bool {
        let mut current = Some(self);
        while let Some(family) = current {
            if family.name == base.name {
                return true;
            }
            current = family.parent;
        }
        false
    }

    /// Iterate from `self` up to the root, `self` first.
    pub fn ancestry(&self) -> impl Iterator<Item = &ModuleFamily> {
        std::iter::successors(Some(self), |family| family.parent)
    }
}

impl PartialEq for ModuleFamily {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for ModuleFamily {}

impl fmt::Debug for ModuleFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path: Vec<&str> = self.ancestry().map(|family| family.name).collect();
        write!(f, "ModuleFamily({})", path.join(" < "))
    }
}

impl fmt::Display for ModuleFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
