//! Types, arguments, extended attributes and literals.

use super::Parser;
use crate::ast::{
    Argument, ArgumentList, DefaultValue, ExtAttrList, ExtAttrRhs, ExtAttrValue,
    ExtendedAttribute, IdlType, Literal, LiteralValue, TypeKind,
};
use crate::error::ParseResult;
use crate::token::TokenKind;

/// Type names that take `<...>` arguments.
const GENERIC_TYPES: &[&str] = &[
    "sequence",
    "FrozenArray",
    "ObservableArray",
    "Promise",
    "record",
    "async_sequence",
];

impl<'a> Parser<'a> {
    /// A type with optional extended attributes and nullable suffix.
    pub(super) fn idl_type(&mut self, message: &str) -> ParseResult<IdlType> {
        let ext_attrs = self.optional_ext_attrs()?;
        let inner = if self.at("(") {
            self.union_type(message)?
        } else {
            self.single_type(message)?
        };
        let mut idl_type = match self.eat("?") {
            Some(question) => IdlType::new(TypeKind::Nullable {
                inner: Box::new(inner),
                question,
            }),
            None => inner,
        };
        idl_type.ext_attrs = ext_attrs;
        Ok(idl_type)
    }

    fn union_type(&mut self, message: &str) -> ParseResult<IdlType> {
        let open = self.bump();
        let mut members = vec![self.idl_type(message)?];
        let mut separators = Vec::new();
        while let Some(or) = self.eat("or") {
            separators.push(or);
            members.push(self.idl_type("No type after `or` in union type")?);
        }
        if members.len() < 2 {
            return Err(self.error("At least two types are expected in a union type"));
        }
        let close = self.expect(")", "Unterminated union type")?;
        Ok(IdlType::new(TypeKind::Union {
            open,
            members,
            separators,
            close,
        }))
    }

    fn single_type(&mut self, message: &str) -> ParseResult<IdlType> {
        if !self.at_kind(TokenKind::Identifier) {
            return Err(self.error(message));
        }
        if GENERIC_TYPES.contains(&self.peek().value.as_str()) && self.peek_at(1).is("<") {
            return self.generic_type();
        }

        let mut tokens = Vec::new();
        if self.at("unsigned") {
            tokens.push(self.bump());
            if !self.at("short") && !self.at("long") {
                return Err(self.error("Failed to parse integer type"));
            }
        } else if self.at("unrestricted") {
            tokens.push(self.bump());
            if !self.at("float") && !self.at("double") {
                return Err(self.error("Failed to parse float type"));
            }
        }
        let long = self.at("long");
        tokens.push(self.bump());
        if long {
            if let Some(second) = self.eat("long") {
                tokens.push(second);
            }
        }

        let name = tokens
            .iter()
            .map(|tok| tok.value.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Ok(IdlType::new(TypeKind::Named { tokens, name }))
    }

    fn generic_type(&mut self) -> ParseResult<IdlType> {
        let name = self.bump();
        let message = format!("Missing type argument for {}", name.value);
        let open = self.bump();
        let mut arguments = vec![self.idl_type(&message)?];
        let mut separators = Vec::new();
        while let Some(comma) = self.eat(",") {
            separators.push(comma);
            arguments.push(self.idl_type(&message)?);
        }
        let close = self.expect(">", &format!("Unterminated generic type {}", name.value))?;
        Ok(IdlType::new(TypeKind::Generic {
            name,
            open,
            arguments,
            separators,
            close,
        }))
    }

    pub(super) fn argument_list(&mut self, message: &str) -> ParseResult<ArgumentList> {
        let open = self.expect("(", message)?;
        let mut arguments = Vec::new();
        let mut separators = Vec::new();
        if !self.at(")") {
            loop {
                arguments.push(self.argument()?);
                match self.eat(",") {
                    Some(comma) => separators.push(comma),
                    None => break,
                }
            }
        }
        let close = self.expect(")", "Unterminated argument list")?;
        Ok(ArgumentList {
            open,
            arguments,
            separators,
            close,
        })
    }

    fn argument(&mut self) -> ParseResult<Argument> {
        let ext_attrs = self.optional_ext_attrs()?;
        let optional = self.eat("optional");
        let idl_type = self.idl_type("Missing argument type")?;
        let variadic = match optional {
            Some(_) => None,
            None => self.eat("..."),
        };
        let name = self.identifier("Missing argument name")?;
        let default = match optional {
            Some(_) => self.optional_default()?,
            None => None,
        };
        Ok(Argument {
            ext_attrs,
            optional,
            idl_type,
            variadic,
            name,
            default,
        })
    }

    pub(super) fn optional_default(&mut self) -> ParseResult<Option<DefaultValue>> {
        let Some(assign) = self.eat("=") else {
            return Ok(None);
        };
        let literal = self.literal("No value for default")?;
        Ok(Some(DefaultValue { assign, literal }))
    }

    pub(super) fn literal(&mut self, message: &str) -> ParseResult<Literal> {
        let token = self.peek().clone();
        let value = match token.kind {
            TokenKind::Integer => LiteralValue::Integer(token.value.clone()),
            TokenKind::Decimal => LiteralValue::Decimal(token.value.clone()),
            TokenKind::String => {
                LiteralValue::String(token.value.trim_matches('"').to_string())
            }
            TokenKind::Identifier => match token.value.as_str() {
                "true" => LiteralValue::Boolean(true),
                "false" => LiteralValue::Boolean(false),
                "null" => LiteralValue::Null,
                "Infinity" => LiteralValue::Infinity { negative: false },
                "-Infinity" => LiteralValue::Infinity { negative: true },
                "NaN" => LiteralValue::NaN,
                "undefined" => LiteralValue::Undefined,
                _ => return Err(self.error(message)),
            },
            TokenKind::Punctuation if token.value == "[" => {
                let open = self.bump();
                let close = self.expect("]", "Default sequence value must be empty")?;
                return Ok(Literal {
                    tokens: vec![open, close],
                    value: LiteralValue::EmptySequence,
                });
            }
            TokenKind::Punctuation if token.value == "{" => {
                let open = self.bump();
                let close = self.expect("}", "Default dictionary value must be empty")?;
                return Ok(Literal {
                    tokens: vec![open, close],
                    value: LiteralValue::EmptyDictionary,
                });
            }
            _ => return Err(self.error(message)),
        };
        Ok(Literal {
            tokens: vec![self.bump()],
            value,
        })
    }

    pub(super) fn optional_ext_attrs(&mut self) -> ParseResult<Option<ExtAttrList>> {
        let Some(open) = self.eat("[") else {
            return Ok(None);
        };
        let mut items = Vec::new();
        let mut separators = Vec::new();
        loop {
            items.push(self.ext_attr()?);
            match self.eat(",") {
                Some(comma) => separators.push(comma),
                None => break,
            }
        }
        let close = self.expect("]", "Unterminated extended attribute list")?;
        Ok(Some(ExtAttrList {
            open,
            items,
            separators,
            close,
        }))
    }

    fn ext_attr(&mut self) -> ParseResult<ExtendedAttribute> {
        let name = self.identifier("Extended attribute lacks a name")?;
        let rhs = match self.eat("=") {
            Some(assign) => Some(ExtAttrRhs {
                assign,
                value: self.ext_attr_value()?,
            }),
            None => None,
        };
        let arguments = if self.at("(") {
            Some(self.argument_list("Invalid extended attribute arguments")?)
        } else {
            None
        };
        Ok(ExtendedAttribute {
            name,
            rhs,
            arguments,
        })
    }

    fn ext_attr_value(&mut self) -> ParseResult<ExtAttrValue> {
        const MISSING: &str = "No right hand side to extended attribute assignment";
        if let Some(open) = self.eat("(") {
            let mut items = Vec::new();
            let mut separators = Vec::new();
            loop {
                if !matches!(
                    self.peek().kind,
                    TokenKind::Identifier
                        | TokenKind::String
                        | TokenKind::Integer
                        | TokenKind::Decimal
                ) {
                    return Err(self.error(MISSING));
                }
                items.push(self.bump());
                match self.eat(",") {
                    Some(comma) => separators.push(comma),
                    None => break,
                }
            }
            let close = self.expect(")", "Unterminated extended attribute value list")?;
            return Ok(ExtAttrValue::List {
                open,
                items,
                separators,
                close,
            });
        }
        let kind = self.peek().kind;
        let value = match kind {
            TokenKind::Identifier => ExtAttrValue::Identifier(self.bump()),
            TokenKind::String => ExtAttrValue::String(self.bump()),
            TokenKind::Integer => ExtAttrValue::Integer(self.bump()),
            TokenKind::Decimal => ExtAttrValue::Decimal(self.bump()),
            TokenKind::Punctuation if self.at("*") => ExtAttrValue::Wildcard(self.bump()),
            _ => return Err(self.error(MISSING)),
        };
        Ok(value)
    }
}
