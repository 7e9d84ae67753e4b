//! Top-level definitions.

use super::Parser;
use crate::ast::{
    unescape, Definition, DefinitionBody, DefinitionKind, ExtAttrList, Inheritance, Member,
};
use crate::error::ParseResult;
use crate::token::Tok;

impl<'a> Parser<'a> {
    pub(super) fn definition(&mut self) -> ParseResult<Definition> {
        let first = self.pos;
        let ext_attrs = self.optional_ext_attrs()?;

        let mut keywords = Vec::new();
        let mut partial = false;
        let kind = if self.at("callback") {
            keywords.push(self.bump());
            if self.at("interface") {
                keywords.push(self.bump());
                DefinitionKind::CallbackInterface
            } else {
                DefinitionKind::Callback
            }
        } else {
            if let Some(tok) = self.eat("partial") {
                keywords.push(tok);
                partial = true;
            }
            if self.at("interface") {
                keywords.push(self.bump());
                if let Some(mixin) = self.eat("mixin") {
                    keywords.push(mixin);
                    DefinitionKind::InterfaceMixin
                } else {
                    DefinitionKind::Interface
                }
            } else if self.at("namespace") {
                keywords.push(self.bump());
                DefinitionKind::Namespace
            } else if self.at("dictionary") {
                keywords.push(self.bump());
                DefinitionKind::Dictionary
            } else if partial {
                return Err(self.error("Partial doesn't apply to anything"));
            } else if self.at("enum") {
                keywords.push(self.bump());
                DefinitionKind::Enum
            } else if self.at("typedef") {
                keywords.push(self.bump());
                return self.typedef(first, ext_attrs, keywords);
            } else if self.peek_at(1).is("includes") {
                return self.includes(first, ext_attrs);
            } else {
                return Err(self.error("Unrecognised definition"));
            }
        };

        if kind == DefinitionKind::Callback {
            return self.callback(first, ext_attrs, keywords);
        }

        let name = self.identifier(&format!("Missing name in {}", keyword_text(&keywords)))?;
        self.context = Some(format!("{} {}", keyword_text(&keywords), name.value));

        let inheritance = if !partial && kind != DefinitionKind::Enum {
            self.inheritance()?
        } else {
            None
        };

        let scope = unescape(&name.value).to_string();
        let open = self.expect("{", &format!("Bodyless {}", keyword_text(&keywords)))?;
        let members = self.definition_members(kind, &scope)?;
        let close = self.expect("}", &format!("Unterminated {}", keyword_text(&keywords)))?;
        let semicolon = self.expect(
            ";",
            &format!("Missing semicolon after {}", keyword_text(&keywords)),
        )?;

        Ok(self.finish(
            first,
            Definition {
                ext_attrs,
                kind,
                partial,
                keywords,
                name,
                inheritance,
                body: DefinitionBody::Members {
                    open,
                    members,
                    close,
                    semicolon,
                },
                span: 0..0,
                source_text: String::new(),
            },
        ))
    }

    fn inheritance(&mut self) -> ParseResult<Option<Inheritance>> {
        let Some(colon) = self.eat(":") else {
            return Ok(None);
        };
        let name = self.identifier("Inheritance lacks a type")?;
        Ok(Some(Inheritance { colon, name }))
    }

    fn definition_members(&mut self, kind: DefinitionKind, scope: &str) -> ParseResult<Vec<Member>> {
        if kind == DefinitionKind::Enum {
            return self.enum_values(scope);
        }
        let mut members = Vec::new();
        while !self.at("}") && !self.at_eof() {
            let member = match kind {
                DefinitionKind::Dictionary => self.field(scope)?,
                _ => self.interface_member(kind, scope)?,
            };
            members.push(member);
        }
        Ok(members)
    }

    fn typedef(
        &mut self,
        first: usize,
        ext_attrs: Option<ExtAttrList>,
        keywords: Vec<Tok>,
    ) -> ParseResult<Definition> {
        let idl_type = self.idl_type("Typedef lacks a type")?;
        let name = self.identifier("Typedef lacks a name")?;
        self.context = Some(format!("typedef {}", name.value));
        let semicolon = self.expect(";", "Unterminated typedef")?;
        Ok(self.finish(
            first,
            Definition {
                ext_attrs,
                kind: DefinitionKind::Typedef,
                partial: false,
                keywords,
                name,
                inheritance: None,
                body: DefinitionBody::Typedef {
                    idl_type,
                    semicolon,
                },
                span: 0..0,
                source_text: String::new(),
            },
        ))
    }

    fn callback(
        &mut self,
        first: usize,
        ext_attrs: Option<ExtAttrList>,
        keywords: Vec<Tok>,
    ) -> ParseResult<Definition> {
        let name = self.identifier("Callback lacks a name")?;
        self.context = Some(format!("callback {}", name.value));
        let assign = self.expect("=", "Callback lacks an assignment")?;
        let return_type = self.idl_type("Callback lacks a return type")?;
        let arguments = self.argument_list("Callback lacks parentheses for arguments")?;
        let semicolon = self.expect(";", "Unterminated callback")?;
        Ok(self.finish(
            first,
            Definition {
                ext_attrs,
                kind: DefinitionKind::Callback,
                partial: false,
                keywords,
                name,
                inheritance: None,
                body: DefinitionBody::Callback {
                    assign,
                    return_type,
                    arguments,
                    semicolon,
                },
                span: 0..0,
                source_text: String::new(),
            },
        ))
    }

    fn includes(&mut self, first: usize, ext_attrs: Option<ExtAttrList>) -> ParseResult<Definition> {
        let name = self.identifier("Includes statement lacks a target")?;
        self.context = Some(format!("{} includes", name.value));
        let keyword = self.expect("includes", "Incomplete includes statement")?;
        let mixin = self.identifier("Incomplete includes statement")?;
        let semicolon = self.expect(";", "No terminating ; for includes statement")?;
        Ok(self.finish(
            first,
            Definition {
                ext_attrs,
                kind: DefinitionKind::Includes,
                partial: false,
                keywords: Vec::new(),
                name,
                inheritance: None,
                body: DefinitionBody::Includes {
                    keyword,
                    mixin,
                    semicolon,
                },
                span: 0..0,
                source_text: String::new(),
            },
        ))
    }

    /// Fill in the span and verbatim text of a definition that started at token `first`.
    fn finish(&self, first: usize, mut definition: Definition) -> Definition {
        let start = self.tokens[first].span.start;
        let end = self.last_end().max(start);
        definition.span = start..end;
        definition.source_text = self.source[start..end].to_string();
        definition
    }
}

fn keyword_text(keywords: &[Tok]) -> String {
    keywords
        .iter()
        .map(|tok| tok.value.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use crate::ast::{DefinitionBody, DefinitionKind, MemberKind};
    use crate::parsing::parse;
    use rstest::rstest;

    #[rstest]
    #[case("interface A {};", DefinitionKind::Interface, false)]
    #[case("partial interface A {};", DefinitionKind::Interface, true)]
    #[case("interface mixin A {};", DefinitionKind::InterfaceMixin, false)]
    #[case("partial interface mixin A {};", DefinitionKind::InterfaceMixin, true)]
    #[case("callback interface A {};", DefinitionKind::CallbackInterface, false)]
    #[case("namespace A {};", DefinitionKind::Namespace, false)]
    #[case("partial namespace A {};", DefinitionKind::Namespace, true)]
    #[case("dictionary A {};", DefinitionKind::Dictionary, false)]
    #[case("partial dictionary A {};", DefinitionKind::Dictionary, true)]
    #[case("enum A { \"a\" };", DefinitionKind::Enum, false)]
    #[case("typedef long A;", DefinitionKind::Typedef, false)]
    #[case("callback A = void ();", DefinitionKind::Callback, false)]
    #[case("A includes B;", DefinitionKind::Includes, false)]
    fn test_definition_kinds(
        #[case] source: &str,
        #[case] kind: DefinitionKind,
        #[case] partial: bool,
    ) {
        let block = parse(source);
        assert!(!block.has_errors(), "{:?}", block.diagnostics);
        let definition = &block.definitions[0];
        assert_eq!(definition.kind, kind);
        assert_eq!(definition.partial, partial);
        assert_eq!(definition.name(), "A");
        assert_eq!(definition.source_text, source);
    }

    #[test]
    fn test_inheritance_and_ext_attrs() {
        let block = parse("[Exposed=Window, SecureContext]\ninterface Square : Shape {};");
        let definition = &block.definitions[0];
        assert_eq!(definition.inherits_from(), Some("Shape"));
        assert!(definition.has_ext_attr("Exposed"));
        assert!(definition.has_ext_attr("SecureContext"));
        assert_eq!(definition.span.start, 0);
    }

    #[test]
    fn test_includes_statement() {
        let block = parse("Window includes GlobalEventHandlers;");
        let definition = &block.definitions[0];
        assert_eq!(definition.name(), "Window");
        assert_eq!(definition.included_mixin(), Some("GlobalEventHandlers"));
    }

    #[test]
    fn test_callback_function() {
        let block = parse("callback SortCallback = boolean (any a, any b);");
        match &block.definitions[0].body {
            DefinitionBody::Callback {
                return_type,
                arguments,
                ..
            } => {
                assert_eq!(return_type.named(), Some("boolean"));
                let names: Vec<&str> = arguments.iter().map(|a| a.name()).collect();
                assert_eq!(names, vec!["a", "b"]);
            }
            other => panic!("unexpected body {:?}", other),
        }
    }

    #[test]
    fn test_enum_values_and_trailing_comma() {
        let block = parse("enum EnumBasic { \"one\", \"two\", \"three\", \"white space\", };");
        let definition = &block.definitions[0];
        let values: Vec<&str> = definition
            .members()
            .iter()
            .map(|m| m.name().unwrap_or_default())
            .collect();
        assert_eq!(values, vec!["one", "two", "three", "white space"]);
        assert!(definition
            .members()
            .iter()
            .all(|m| m.kind == MemberKind::EnumValue && m.scope == "EnumBasic"));
    }

    #[test]
    fn test_escaped_definition_name() {
        let block = parse("interface _Foo {};");
        assert_eq!(block.definitions[0].name(), "Foo");
        assert_eq!(block.definitions[0].key(), "foo");
    }

    #[test]
    fn test_multiple_definitions_keep_spans() {
        let source = "dictionary Roselia { DOMString hikawa; };\ndictionary PastelPalettes { DOMString hikawa; };";
        let block = parse(source);
        assert_eq!(block.definitions.len(), 2);
        let second = &block.definitions[1];
        assert_eq!(&source[second.span.clone()], second.source_text);
        assert!(second.source_text.starts_with("dictionary PastelPalettes"));
    }

    #[rstest]
    #[case("interface {};", "Missing name in interface")]
    #[case("interface A {}", "Missing semicolon after interface")]
    #[case("interface A { ", "Unterminated interface")]
    #[case("partial enum A {};", "Partial doesn't apply to anything")]
    #[case("foo;", "Unrecognised definition")]
    #[case("enum A {};", "No value in enum")]
    fn test_syntax_errors(#[case] source: &str, #[case] message: &str) {
        let block = parse(source);
        assert!(block.definitions.is_empty());
        assert!(
            block.diagnostics[0].message.contains(message),
            "{}",
            block.diagnostics[0].message
        );
        assert_eq!(block.to_source(), source);
    }
}
