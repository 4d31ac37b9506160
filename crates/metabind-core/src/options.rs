//! Build options threaded through every stage.

/// Names of the generic target-side placeholder types.
///
/// Overload branches taking one of these accept almost anything, so the
/// planner orders them after every specific branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatchAllNames {
    pub any_object: String,
    pub sequence: String,
    pub buffer: String,
    pub variant: String,
    pub string: String,
    pub byte_array: String,
}

impl Default for CatchAllNames {
    fn default() -> Self {
        Self {
            any_object: "PyObject".into(),
            sequence: "PySequence".into(),
            buffer: "PyBuffer".into(),
            variant: "QVariant".into(),
            string: "QString".into(),
            byte_array: "QByteArray".into(),
        }
    }
}

/// Options for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    pub catch_all: CatchAllNames,
    /// Attach a Graphviz rendering to cycle diagnostics.
    pub dump_cyclic_graphs: bool,
    /// Skip declared classes with no type rule; otherwise register them as object types.
    pub skip_undeclared_classes: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            catch_all: CatchAllNames::default(),
            dump_cyclic_graphs: true,
            skip_undeclared_classes: true,
        }
    }
}

impl BuildOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catch_all(mut self, catch_all: CatchAllNames) -> Self {
        self.catch_all = catch_all;
        self
    }

    pub fn with_cyclic_graphs(mut self, dump: bool) -> Self {
        self.dump_cyclic_graphs = dump;
        self
    }

    pub fn with_undeclared_classes_skipped(mut self, skip: bool) -> Self {
        self.skip_undeclared_classes = skip;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = BuildOptions::default();
        assert!(opts.dump_cyclic_graphs);
        assert!(opts.skip_undeclared_classes);
        assert_eq!(opts.catch_all.any_object, "PyObject");
        assert_eq!(opts.catch_all.byte_array, "QByteArray");

        let opts = opts.with_undeclared_classes_skipped(false);
        assert!(!opts.skip_undeclared_classes);
    }
}
