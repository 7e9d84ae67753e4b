//! Members: interface and namespace members, dictionary fields, enum values.

use super::Parser;
use crate::ast::{DefinitionKind, ExtAttrList, Member, MemberBody, MemberKind};
use crate::error::ParseResult;
use crate::token::{Tok, TokenKind};

impl<'a> Parser<'a> {
    pub(super) fn interface_member(
        &mut self,
        container: DefinitionKind,
        scope: &str,
    ) -> ParseResult<Member> {
        let ext_attrs = self.optional_ext_attrs()?;

        if self.at("const") {
            return self.constant(ext_attrs, scope);
        }
        if self.at("constructor") && self.peek_at(1).is("(") {
            let keyword = self.bump();
            let arguments = self.argument_list("Constructor lacks parentheses")?;
            let semicolon = self.expect(";", "Unterminated constructor")?;
            return Ok(member(
                ext_attrs,
                MemberKind::Constructor,
                scope,
                MemberBody::Constructor {
                    keyword,
                    arguments,
                    semicolon,
                },
            ));
        }
        if self.at("stringifier") && self.peek_at(1).is(";") {
            let modifier = self.bump();
            let semicolon = self.bump();
            return Ok(member(
                ext_attrs,
                MemberKind::Stringifier,
                scope,
                MemberBody::Operation {
                    modifiers: vec![modifier],
                    return_type: None,
                    name: None,
                    arguments: None,
                    semicolon,
                },
            ));
        }
        if self.at("iterable")
            || self.at("maplike")
            || self.at("setlike")
            || (self.at("async") && self.peek_at(1).is("iterable"))
            || (self.at("readonly")
                && (self.peek_at(1).is("maplike") || self.peek_at(1).is("setlike")))
        {
            return self.declaration(ext_attrs, scope);
        }

        let mut modifiers = Vec::new();
        for word in ["static", "stringifier", "inherit", "readonly"] {
            if let Some(tok) = self.eat(word) {
                modifiers.push(tok);
            }
        }
        if self.at("attribute") {
            return self.attribute(ext_attrs, modifiers, scope);
        }
        if modifiers.iter().any(|tok| tok.value == "readonly" || tok.value == "inherit") {
            return Err(self.error("Attributes must be declared with `attribute`"));
        }

        let mut kind = if modifiers.iter().any(|tok| tok.value == "stringifier") {
            MemberKind::Stringifier
        } else {
            MemberKind::Operation
        };
        if modifiers.is_empty() && container != DefinitionKind::Namespace {
            for (word, special) in [
                ("getter", MemberKind::Getter),
                ("setter", MemberKind::Setter),
                ("deleter", MemberKind::Deleter),
            ] {
                if let Some(tok) = self.eat(word) {
                    modifiers.push(tok);
                    kind = special;
                    break;
                }
            }
        }
        self.operation(ext_attrs, modifiers, kind, scope)
    }

    fn attribute(
        &mut self,
        ext_attrs: Option<ExtAttrList>,
        modifiers: Vec<Tok>,
        scope: &str,
    ) -> ParseResult<Member> {
        let keyword = self.bump();
        let idl_type = self.idl_type("Attribute lacks a type")?;
        let name = self.identifier("Attribute lacks a name")?;
        let semicolon = self.expect(";", "Unterminated attribute")?;
        Ok(member(
            ext_attrs,
            MemberKind::Attribute,
            scope,
            MemberBody::Attribute {
                modifiers,
                keyword,
                idl_type,
                name,
                semicolon,
            },
        ))
    }

    fn operation(
        &mut self,
        ext_attrs: Option<ExtAttrList>,
        modifiers: Vec<Tok>,
        kind: MemberKind,
        scope: &str,
    ) -> ParseResult<Member> {
        let return_type = self.idl_type("Missing return type")?;
        let name = if self.at_kind(TokenKind::Identifier) {
            Some(self.bump())
        } else {
            None
        };
        let arguments = self.argument_list("Invalid operation")?;
        let semicolon = self.expect(";", "Unterminated operation")?;
        Ok(member(
            ext_attrs,
            kind,
            scope,
            MemberBody::Operation {
                modifiers,
                return_type: Some(return_type),
                name,
                arguments: Some(arguments),
                semicolon,
            },
        ))
    }

    fn constant(&mut self, ext_attrs: Option<ExtAttrList>, scope: &str) -> ParseResult<Member> {
        let keyword = self.bump();
        let idl_type = self.idl_type("Const lacks a type")?;
        let name = self.identifier("Const lacks a name")?;
        let assign = self.expect("=", "Const lacks value assignment")?;
        let value = self.literal("Const lacks a value")?;
        let semicolon = self.expect(";", "Unterminated const")?;
        Ok(member(
            ext_attrs,
            MemberKind::Constant,
            scope,
            MemberBody::Constant {
                keyword,
                idl_type,
                name,
                assign,
                value,
                semicolon,
            },
        ))
    }

    /// `iterable<V>`, `iterable<K, V>`, `async iterable<V>(args)`, `[readonly] maplike<K, V>`,
    /// `[readonly] setlike<V>`.
    fn declaration(&mut self, ext_attrs: Option<ExtAttrList>, scope: &str) -> ParseResult<Member> {
        let mut modifiers = Vec::new();
        if let Some(tok) = self.eat("readonly") {
            modifiers.push(tok);
        }
        if let Some(tok) = self.eat("async") {
            modifiers.push(tok);
        }
        let keyword = self.bump();
        let kind = match keyword.value.as_str() {
            "maplike" => MemberKind::Maplike,
            "setlike" => MemberKind::Setlike,
            _ if modifiers.iter().any(|tok| tok.value == "async") => MemberKind::AsyncIterable,
            _ => MemberKind::Iterable,
        };
        let (min, max) = match kind {
            MemberKind::Maplike => (2, 2),
            MemberKind::Setlike => (1, 1),
            _ => (1, 2),
        };

        let message = format!("Missing type arguments for {}", keyword.value);
        let open = self.expect("<", &message)?;
        let mut types = vec![self.idl_type(&message)?];
        let mut separators = Vec::new();
        while let Some(comma) = self.eat(",") {
            separators.push(comma);
            types.push(self.idl_type(&message)?);
        }
        if types.len() < min || types.len() > max {
            return Err(self.error(&format!(
                "{} declaration expects {} type argument(s)",
                keyword.value,
                if min == max {
                    min.to_string()
                } else {
                    format!("{} or {}", min, max)
                }
            )));
        }
        let close = self.expect(">", &format!("Unterminated {} declaration", keyword.value))?;

        let arguments = if kind == MemberKind::AsyncIterable && self.at("(") {
            Some(self.argument_list("Invalid async iterable arguments")?)
        } else {
            None
        };
        let semicolon = self.expect(
            ";",
            &format!("Missing semicolon after {} declaration", keyword.value),
        )?;
        Ok(member(
            ext_attrs,
            kind,
            scope,
            MemberBody::Declaration {
                modifiers,
                keyword,
                open,
                types,
                separators,
                close,
                arguments,
                semicolon,
            },
        ))
    }

    pub(super) fn field(&mut self, scope: &str) -> ParseResult<Member> {
        let ext_attrs = self.optional_ext_attrs()?;
        let required = self.eat("required");
        let idl_type = self.idl_type("Dictionary member lacks a type")?;
        let name = self.identifier("Dictionary member lacks a name")?;
        let default = self.optional_default()?;
        if required.is_some() && default.is_some() {
            return Err(self.error("Required member must not have a default"));
        }
        let semicolon = self.expect(";", "Unterminated dictionary member")?;
        Ok(member(
            ext_attrs,
            MemberKind::Field,
            scope,
            MemberBody::Field {
                required,
                idl_type,
                name,
                default,
                semicolon,
            },
        ))
    }

    pub(super) fn enum_values(&mut self, scope: &str) -> ParseResult<Vec<Member>> {
        let mut values = Vec::new();
        while self.at_kind(TokenKind::String) {
            let value = self.bump();
            let separator = self.eat(",");
            let last = separator.is_none();
            values.push(member(
                None,
                MemberKind::EnumValue,
                scope,
                MemberBody::EnumValue { value, separator },
            ));
            if last {
                break;
            }
        }
        if values.is_empty() {
            return Err(self.error("No value in enum"));
        }
        Ok(values)
    }
}

fn member(ext_attrs: Option<ExtAttrList>, kind: MemberKind, scope: &str, body: MemberBody) -> Member {
    Member {
        ext_attrs,
        kind,
        scope: scope.to_string(),
        body,
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{Member, MemberKind};
    use crate::parsing::parse;
    use rstest::rstest;

    fn members(source: &str) -> Vec<Member> {
        let block = parse(source);
        assert!(!block.has_errors(), "{:?}", block.diagnostics);
        block.definitions[0].members().to_vec()
    }

    fn only(body: &str) -> Member {
        let mut all = members(&format!("interface I {{ {} }};", body));
        assert_eq!(all.len(), 1);
        all.remove(0)
    }

    #[rstest]
    #[case("attribute long x;", MemberKind::Attribute, Some("x"))]
    #[case("readonly attribute long x;", MemberKind::Attribute, Some("x"))]
    #[case("inherit attribute long x;", MemberKind::Attribute, Some("x"))]
    #[case("stringifier attribute DOMString x;", MemberKind::Attribute, Some("x"))]
    #[case("static attribute long x;", MemberKind::Attribute, Some("x"))]
    #[case("void f();", MemberKind::Operation, Some("f"))]
    #[case("static void f();", MemberKind::Operation, Some("f"))]
    #[case("getter DOMString (unsigned long index);", MemberKind::Getter, None)]
    #[case("getter DOMString named(DOMString name);", MemberKind::Getter, Some("named"))]
    #[case("setter void (DOMString name, any value);", MemberKind::Setter, None)]
    #[case("deleter void (DOMString name);", MemberKind::Deleter, None)]
    #[case("stringifier DOMString ();", MemberKind::Stringifier, None)]
    #[case("stringifier;", MemberKind::Stringifier, None)]
    #[case("constructor(long x);", MemberKind::Constructor, Some("constructor"))]
    #[case("const short ONE = 1;", MemberKind::Constant, Some("ONE"))]
    #[case("iterable<long>;", MemberKind::Iterable, None)]
    #[case("iterable<DOMString, long>;", MemberKind::Iterable, None)]
    #[case("async iterable<long>;", MemberKind::AsyncIterable, None)]
    #[case("async iterable<long>(optional long start);", MemberKind::AsyncIterable, None)]
    #[case("maplike<DOMString, long>;", MemberKind::Maplike, None)]
    #[case("readonly maplike<DOMString, long>;", MemberKind::Maplike, None)]
    #[case("setlike<long>;", MemberKind::Setlike, None)]
    #[case("readonly setlike<long>;", MemberKind::Setlike, None)]
    fn test_interface_members(
        #[case] body: &str,
        #[case] kind: MemberKind,
        #[case] name: Option<&str>,
    ) {
        let member = only(body);
        assert_eq!(member.kind, kind);
        assert_eq!(member.name(), name);
        assert_eq!(member.scope, "I");
    }

    #[test]
    fn test_attribute_flags() {
        let member = only("[SameObject] static readonly attribute long _readonly;");
        assert!(member.is_static());
        assert!(member.is_readonly());
        assert!(member.has_ext_attr("SameObject"));
        assert_eq!(member.name(), Some("readonly"));
        assert_eq!(member.name_tok().map(|t| t.value.as_str()), Some("_readonly"));
    }

    #[test]
    fn test_keyword_names_are_accepted() {
        let member = only("void includes(DOMString required, long attribute);");
        let arguments = member.arguments().expect("arguments");
        let names: Vec<&str> = arguments.iter().map(|a| a.name()).collect();
        assert_eq!(member.name(), Some("includes"));
        assert_eq!(names, vec!["required", "attribute"]);
    }

    #[test]
    fn test_dictionary_fields() {
        let fields = members(
            "dictionary D : Base {\n  required long a;\n  DOMString b = \"melon\";\n  [Clamp] octet c;\n};",
        );
        assert_eq!(fields.len(), 3);
        assert!(fields[0].is_required());
        assert!(!fields[1].is_required());
        assert_eq!(fields[1].default().map(|l| l.text()), Some("\"melon\"".to_string()));
        assert!(fields[2].has_ext_attr("Clamp"));
        assert!(fields.iter().all(|f| f.kind == MemberKind::Field));
    }

    #[test]
    fn test_namespace_members() {
        let all = members("namespace N { readonly attribute long x; long f(); };");
        assert_eq!(all[0].kind, MemberKind::Attribute);
        assert_eq!(all[1].kind, MemberKind::Operation);
    }

    #[rstest]
    #[case("interface I { readonly long x; };", "Attributes must be declared")]
    #[case("interface I { maplike<long>; };", "expects 2 type argument(s)")]
    #[case("interface I { setlike<long, long>; };", "expects 1 type argument(s)")]
    #[case("interface I { iterable<long> };", "Missing semicolon after iterable")]
    #[case("dictionary D { required long a = 1; };", "Required member must not have a default")]
    #[case("interface I { const long X; };", "Const lacks value assignment")]
    fn test_member_errors(#[case] source: &str, #[case] message: &str) {
        let block = parse(source);
        assert!(block.has_errors());
        assert!(
            block.diagnostics[0].message.contains(message),
            "{}",
            block.diagnostics[0].message
        );
    }
}
