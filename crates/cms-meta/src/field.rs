//! Field lookup by flattened key path
//!
//! Resolves the schema behind any key of a flattened entry, e.g.
//! `author.name`, `tags.0`, `sections.2.title` or `script.code`, along with
//! the effective i18n mode inherited from enclosing fields.

use cms_content::path::{FlattenedContent, KeyPath, PathSegment};
use serde_json::Value;

use crate::config::{Field, I18nMode, Widget};

/// A field found by [`get_field`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldRef<'a> {
    pub field: &'a Field,
    /// The field's own mode, or the nearest enclosing field's
    pub i18n: I18nMode,
}

impl<'a> FieldRef<'a> {
    fn child(&self, field: &'a Field) -> Self {
        Self {
            field,
            i18n: field.i18n.unwrap_or(self.i18n),
        }
    }

    pub fn widget(&self) -> &'a Widget {
        &self.field.widget
    }
}

enum Cursor<'a> {
    /// At a field
    Field(FieldRef<'a>),
    /// At an object-like list item or variable-type value whose children
    /// are `fields`
    Group {
        owner: FieldRef<'a>,
        fields: &'a [Field],
    },
}

fn type_name<'v>(values: &'v FlattenedContent, at: &KeyPath, type_key: &str) -> Option<&'v str> {
    values.get(&at.child(type_key)).and_then(Value::as_str)
}

/// Look up the field behind `key_path`.
///
/// `values` is the flattened content the key path belongs to; it is needed
/// to read the type name of variable-type objects and list items. Returns
/// `None` for paths that do not map to any field.
pub fn get_field<'a>(
    fields: &'a [Field],
    key_path: &KeyPath,
    values: &FlattenedContent,
) -> Option<FieldRef<'a>> {
    let segments = key_path.segments();
    let (first, _) = segments.split_first()?;
    let name = first.as_key()?;
    let top = fields.iter().find(|f| f.name == name)?;
    let mut cursor = Cursor::Field(FieldRef {
        field: top,
        i18n: top.i18n.unwrap_or_default(),
    });

    for position in 1..segments.len() {
        let at = KeyPath::from_segments(segments[..position].to_vec());
        cursor = match (cursor, &segments[position]) {
            (Cursor::Field(current), PathSegment::Key(key)) => {
                let field = current.field;
                match &field.widget {
                    Widget::Object if field.types.is_some() => {
                        if *key == field.type_key {
                            Cursor::Field(current)
                        } else {
                            let name = type_name(values, &at, &field.type_key)?;
                            let variant = field.variable_type(name)?;
                            let child =
                                variant.fields.as_deref()?.iter().find(|f| f.name == *key)?;
                            Cursor::Field(current.child(child))
                        }
                    }
                    Widget::Object => {
                        let child = field.fields.as_deref()?.iter().find(|f| f.name == *key)?;
                        Cursor::Field(current.child(child))
                    }
                    Widget::KeyValue => Cursor::Field(current),
                    Widget::Code if !field.output_code_only => {
                        let keys = field.code_keys();
                        if *key == keys.code || *key == keys.lang {
                            Cursor::Field(current)
                        } else {
                            return None;
                        }
                    }
                    _ => return None,
                }
            }
            (Cursor::Field(current), PathSegment::Index(index)) => {
                let field = current.field;
                match &field.widget {
                    Widget::List => {
                        if let Some(item) = field.field.as_deref() {
                            Cursor::Field(current.child(item))
                        } else if field.types.is_some() {
                            let item_path = at.index(*index);
                            let name = type_name(values, &item_path, &field.type_key)?;
                            let variant = field.variable_type(name)?;
                            Cursor::Group {
                                owner: current,
                                fields: variant.fields.as_deref().unwrap_or_default(),
                            }
                        } else if let Some(fields) = field.fields.as_deref() {
                            Cursor::Group {
                                owner: current,
                                fields,
                            }
                        } else {
                            Cursor::Field(current)
                        }
                    }
                    _ if field.multiple => Cursor::Field(current),
                    _ => return None,
                }
            }
            (Cursor::Group { owner, fields }, PathSegment::Key(key)) => {
                if owner.field.types.is_some() && *key == owner.field.type_key {
                    Cursor::Field(owner)
                } else {
                    let child = fields.iter().find(|f| f.name == *key)?;
                    Cursor::Field(owner.child(child))
                }
            }
            (Cursor::Group { .. }, PathSegment::Index(_)) => return None,
        };
    }

    match cursor {
        Cursor::Field(found) => Some(found),
        Cursor::Group { owner, .. } => Some(owner),
    }
}
