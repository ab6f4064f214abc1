//! Canned output fragments.

pub const DEFAULT_HELPER_MODULE: &str = "flare/ctr";

pub const ELEMENT_CALL: &str = "_VV";
pub const TEXT_CALL: &str = "_VVT";
pub const VALUE_CALL: &str = "_VVD";

pub const EXPORT_MARKER: &str = "/*export*/";
pub const EXPORTS_DEFAULT: &str = "exports.default";

pub const XML_COMMENT_OPEN: &str = "/***";
pub const XML_COMMENT_CLOSE: &str = "**/";

pub const HOIST_INDENT: &str = "  ";

/// `const { _VV, _VVT, _VVD } = require('<module>');` with no trailing newline,
/// so source line N stays output line N.
pub fn helper_header(module: &str) -> String {
    format!(
        "const {{ {}, {}, {} }} = require('{}');",
        ELEMENT_CALL, TEXT_CALL, VALUE_CALL, module
    )
}

/// Accessor pair and trigger method generated for `event on<Name>;`.
pub fn event_members(name: &str) -> String {
    format!(
        "get on{name}() {{ return this.getNoticer('{name}') }}\
         set on{name}(func) {{ this.addDefaultListener('{name}', func) }}\
         trigger{name}(ev,is_ev) {{ return this.$trigger('{name}',ev,is_ev) }}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helper_header() {
        assert_eq!(
            helper_header(DEFAULT_HELPER_MODULE),
            "const { _VV, _VVT, _VVD } = require('flare/ctr');"
        );
    }

    #[test]
    fn test_event_members() {
        assert_eq!(
            event_members("Click"),
            "get onClick() { return this.getNoticer('Click') }\
             set onClick(func) { this.addDefaultListener('Click', func) }\
             triggerClick(ev,is_ev) { return this.$trigger('Click',ev,is_ev) }"
        );
    }
}
