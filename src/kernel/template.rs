//! Canned file templates.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    Component,
    Page,
    Module,
    Script,
    Markup,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTemplate(pub String);

impl fmt::Display for UnknownTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown template {:?} (expected one of:", self.0)?;
        for kind in TemplateKind::ALL {
            write!(f, " {}", kind.as_str())?;
        }
        write!(f, ")")
    }
}

impl std::error::Error for UnknownTemplate {}

impl FromStr for TemplateKind {
    type Err = UnknownTemplate;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownTemplate(s.to_string()))
    }
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 5] = [
        Self::Component,
        Self::Page,
        Self::Module,
        Self::Script,
        Self::Markup,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Component => "component",
            Self::Page => "page",
            Self::Module => "module",
            Self::Script => "script",
            Self::Markup => "markup",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Component | Self::Page => "tsx",
            Self::Module => "ts",
            Self::Script => "js",
            Self::Markup => "html",
        }
    }

    pub fn file_name(self, name: &str) -> String {
        format!("{}.{}", name, self.extension())
    }

    /// File name and initial content for a template instance called `name`.
    pub fn render(self, name: &str) -> (String, String) {
        let content = match self {
            Self::Component => format!(
                "import React from 'react';\n\n\
                 interface {name}Props {{}}\n\n\
                 export const {name}: React.FC<{name}Props> = () => {{\n  \
                 return (\n    <div>\n      <h1>{name}</h1>\n    </div>\n  );\n}};\n"
            ),
            Self::Page => format!(
                "import React from 'react';\n\n\
                 const {name}Page: React.FC = () => {{\n  \
                 return (\n    <div className=\"page\">\n      <h1>{name}</h1>\n      \
                 <p>Welcome to {name}</p>\n    </div>\n  );\n}};\n\n\
                 export default {name}Page;\n"
            ),
            Self::Module => format!(
                "// {name}.ts\n\nexport class {name} {{\n  constructor() {{}}\n}}\n"
            ),
            Self::Script => format!(
                "// {name}.js\n\nexport const {name} = () => {{\n  \
                 console.log('{name} initialized');\n}};\n"
            ),
            Self::Markup => format!(
                "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n  <meta charset=\"UTF-8\">\n  \
                 <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n  \
                 <title>{name}</title>\n</head>\n<body>\n  <h1>{name}</h1>\n</body>\n</html>\n"
            ),
        };
        (self.file_name(name), content)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/template.rs"]
mod tests;
