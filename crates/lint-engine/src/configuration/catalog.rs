use crate::configuration::OptionKind;

/// Options switched on in the default preference scope of a fresh workspace.
pub const DEFAULT_ENABLED_OPTIONS: &[&str] = &["eqeqeq", "undef", "white"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionSpec {
    pub name: &'static str,
    pub kind: OptionKind,
    pub description: &'static str,
}

const fn boolean(name: &'static str, description: &'static str) -> OptionSpec {
    OptionSpec {
        name,
        kind: OptionKind::Boolean,
        description,
    }
}

const JSLINT_OPTIONS: &[OptionSpec] = &[
    boolean("adsafe", "If use of some browser features should be restricted"),
    boolean("bitwise", "If bitwise operators should not be allowed"),
    boolean("browser", "If the standard browser globals should be predefined"),
    boolean("cap", "If upper case HTML should be allowed"),
    boolean("css", "If CSS workarounds should be tolerated"),
    boolean("debug", "If debugger statements should be allowed"),
    boolean("devel", "If logging should be allowed (console, alert, etc.)"),
    boolean("eqeqeq", "If === should be required"),
    boolean("es5", "If ES5 syntax should be allowed"),
    boolean("evil", "If eval should be allowed"),
    boolean("forin", "If for in statements must filter"),
    boolean("fragment", "If HTML fragments should be allowed"),
    boolean("immed", "If immediate invocations must be wrapped in parens"),
    boolean("laxbreak", "If line breaks should not be checked"),
    boolean("newcap", "If constructor names must be capitalized"),
    boolean("nomen", "If names should be checked"),
    boolean("on", "If HTML event handlers should be allowed"),
    boolean("onevar", "If only one var statement per function should be allowed"),
    boolean("passfail", "If the scan should stop on first error"),
    boolean("plusplus", "If increment/decrement should not be allowed"),
    boolean("regexp", "If the . should not be allowed in regexp literals"),
    boolean("rhino", "If the Rhino environment globals should be predefined"),
    boolean("safe", "If use of some browser features should be restricted"),
    boolean("strict", "Require the \"use strict\"; pragma"),
    boolean("sub", "If all forms of subscript notation are tolerated"),
    boolean("undef", "If variables should be declared before used"),
    boolean("white", "If strict whitespace rules apply"),
    boolean("widget", "If the Yahoo Widgets globals should be predefined"),
    boolean("windows", "If MS Windows-specific globals should be predefined"),
    OptionSpec {
        name: "indent",
        kind: OptionKind::Integer,
        description: "The number of spaces used for indentation (default is 4)",
    },
    OptionSpec {
        name: "maxerr",
        kind: OptionKind::Integer,
        description: "The maximum number of warnings reported (default is 50)",
    },
    OptionSpec {
        name: "maxlen",
        kind: OptionKind::Integer,
        description: "Maximum line length",
    },
    OptionSpec {
        name: "predef",
        kind: OptionKind::StringList,
        description: "The names of predefined global variables",
    },
];

/// The set of analyzer options a session reads from the preference store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionCatalog {
    specs: Vec<OptionSpec>,
}

impl OptionCatalog {
    pub fn new(specs: Vec<OptionSpec>) -> Self {
        Self { specs }
    }

    /// The JSLint option set
    pub fn jslint() -> Self {
        Self::new(JSLINT_OPTIONS.to_vec())
    }

    pub fn get(&self, name: &str) -> Option<&OptionSpec> {
        self.specs.iter().find(|spec| spec.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &OptionSpec> {
        self.specs.iter()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl Default for OptionCatalog {
    fn default() -> Self {
        Self::jslint()
    }
}
