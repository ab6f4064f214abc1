//! # Document Tail
//!
//! Statements the main pass cannot emit in place are appended once the whole
//! document has been parsed:
//!
//! 1. **Hoisted fields**: one `Object.assign(Class.prototype, {...});` per
//!    class with instance fields and one `Object.assign(Class, {...});` per
//!    class with static fields, in class declaration order.
//! 2. **Exports**: `exports.name = local;` per collected binding, in
//!    declaration order.
//! 3. **Default export**: `exports.default = name;` for a named default
//!    declaration.
//!
//! Every statement starts on a new line and the tail ends with a newline, so
//! the transformed body keeps its source line numbers.

use indexmap::IndexMap;

use crate::class_fields::ClassFieldRecord;
use crate::modules::ExportBinding;
use crate::snippets::{EXPORTS_DEFAULT, HOIST_INDENT};

pub fn assemble_tail(
    classes: &[ClassFieldRecord],
    exports: &[ExportBinding],
    export_default: Option<&str>,
) -> String {
    let mut tail = String::new();

    for record in classes.iter().filter(|record| !record.is_empty()) {
        if !record.fields.is_empty() {
            let target = format!("{}.prototype", record.class_name);
            write_assign(&mut tail, &target, &record.fields);
        }
        if !record.static_fields.is_empty() {
            write_assign(&mut tail, &record.class_name, &record.static_fields);
        }
    }

    for binding in exports {
        tail.push_str(&format!(
            "\nexports.{} = {};",
            binding.exported, binding.local
        ));
    }

    if let Some(name) = export_default {
        tail.push_str(&format!("\n{} = {};", EXPORTS_DEFAULT, name));
    }

    tail.push('\n');
    tail
}

fn write_assign(tail: &mut String, target: &str, fields: &IndexMap<String, String>) {
    tail.push_str(&format!("\nObject.assign({}, {{\n", target));
    for (name, value) in fields {
        tail.push_str(&format!("{}{}: {},\n", HOIST_INDENT, name, value.trim()));
    }
    tail.push_str("});");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_tail_is_a_newline() {
        assert_eq!(assemble_tail(&[], &[], None), "\n");
    }

    #[test]
    fn test_tail_order() {
        let mut a = ClassFieldRecord::new(0, "A");
        a.fields.insert("x".into(), " 1 + 1".into());
        a.static_fields.insert("count".into(), " 0".into());
        let empty = ClassFieldRecord::new(1, "B");

        let exports = vec![
            ExportBinding::same("a"),
            ExportBinding {
                exported: "c".into(),
                local: "b".into(),
            },
        ];

        assert_eq!(
            assemble_tail(&[a, empty], &exports, Some("A")),
            "\nObject.assign(A.prototype, {\n  x: 1 + 1,\n});\
             \nObject.assign(A, {\n  count: 0,\n});\
             \nexports.a = a;\
             \nexports.c = b;\
             \nexports.default = A;\n"
        );
    }
}
