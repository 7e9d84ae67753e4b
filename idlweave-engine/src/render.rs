//! Rendering
//!
//!     Each block is rendered on its own, from its own definitions, in one pass in source
//!     order. Text is never rewritten: every token is emitted with its trivia, so the text
//!     content of the result equals the block source. What rendering adds is structure:
//!
//!         pre.idl
//!         ├── (definition trivia)
//!         └── span.idlInterface#idl-def-foo[data-title=Foo]
//!             ├── span.extAttr ...
//!             ├── dfn.idlID#dom-foo | a.idlID.internalDFN
//!             └── span.idlAttribute#idl-def-foo-bar[data-title=bar]
//!                 ├── span.idlType  (outermost type only, with its leading trivia)
//!                 │   └── a | text  (one per type leaf)
//!                 └── dfn.idlName#dom-foo-bar | a.idlName.internalDFN
//!
//!     A definition's leading trivia stays outside its wrapper; a member's leading trivia
//!     goes inside. Trivia holding a comment is wrapped in `span.idlSectionComment`.
//!
//!     Names the host defines with a `<dfn>` link to it. Every other definition and named
//!     member defines itself with an inline `dfn` carrying the generated anchor, so prose
//!     can still target it.

use crate::ids::{
    definition_anchor, definition_wrapper_id, member_anchor, member_wrapper_id, AnchorPlan,
    DefinitionRef, MemberRef,
};
use crate::kinds::{definition_class, member_class, DfnType, IdlKind};
use crate::markup::{Element, Markup, Tag};
use crate::registry::BlockId;
use crate::resolver::{ReferenceKind, Resolution, Resolver, Target};
use crate::terms::TermClaims;
use idlweave_parser::ast::{
    Argument, ArgumentList, DefaultValue, Definition, DefinitionBody, DefinitionKind,
    ExtAttrList, ExtAttrValue, ExtendedAttribute, IdlType, Literal, Member, MemberBody,
    MemberKind, ParsedBlock, TypeKind,
};
use idlweave_parser::token::{trivia_has_comment, Tok};

pub const OFFENDING_CLASS: &str = "respec-offending-element";

/// Everything a block needs to resolve its names.
pub struct RenderContext<'r, 'a> {
    pub resolver: Resolver<'r, 'a>,
    pub plan: &'r AnchorPlan,
    pub claims: &'r TermClaims,
}

/// Render one parsed block to a `pre.idl` element.
pub fn render(block: &ParsedBlock, at: BlockId, cx: &RenderContext<'_, '_>) -> Element {
    let mut renderer = BlockRenderer {
        cx,
        block: at.0,
        skip_trivia: false,
    };
    let mut pre = Element::new(Tag::Pre).class("idl");
    for (index, definition) in block.definitions.iter().enumerate() {
        renderer.definition(&mut pre, definition, index);
    }
    match &block.remainder {
        Some(remainder) => pre.text(remainder),
        None => renderer.trivia(&mut pre, &block.eof.trivia),
    }
    pre
}

fn link_element(target: &Target, class: Option<&str>) -> Element {
    let mut a = Element::new(Tag::A);
    if let Some(class) = class {
        a.add_class(class);
    }
    if target.is_internal() {
        a.add_class("internalDFN");
    }
    a.set_attr("href", target.href.clone());
    a.set_attr("data-link-type", target.link_type.clone());
    if !target.is_internal() {
        a.set_attr("data-xref-type", target.link_type.clone());
    }
    a
}

fn text_element(mut element: Element, text: &str) -> Markup {
    element.text(text);
    element.into()
}

struct BlockRenderer<'c, 'r, 'a> {
    cx: &'c RenderContext<'r, 'a>,
    block: usize,
    /// Drop the next trivia: it was already emitted outside a wrapper.
    skip_trivia: bool,
}

impl BlockRenderer<'_, '_, '_> {
    fn trivia(&mut self, out: &mut Element, trivia: &str) {
        if std::mem::take(&mut self.skip_trivia) || trivia.is_empty() {
            return;
        }
        if trivia_has_comment(trivia) {
            out.push(text_element(Element::span("idlSectionComment"), trivia));
        } else {
            out.text(trivia);
        }
    }

    fn tok(&mut self, out: &mut Element, tok: &Tok) {
        self.trivia(out, &tok.trivia);
        out.text(&tok.value);
    }

    fn toks(&mut self, out: &mut Element, toks: &[Tok]) {
        for tok in toks {
            self.tok(out, tok);
        }
    }

    fn resolve_type(&self, name: &str) -> Resolution {
        self.cx.resolver.resolve(name, ReferenceKind::Type, None)
    }

    /// A token whose value is a type name: trivia, then a link or plain text.
    fn type_reference(&mut self, out: &mut Element, tok: &Tok, name: &str, class: Option<&str>) {
        self.trivia(out, &tok.trivia);
        match self.resolve_type(name) {
            Resolution::Linked(target) => {
                out.push(text_element(link_element(&target, class), &tok.value))
            }
            Resolution::Unresolved => match class {
                Some(class) => out.push(text_element(Element::span(class), &tok.value)),
                None => out.text(&tok.value),
            },
        }
    }

    fn definition(&mut self, out: &mut Element, definition: &Definition, index: usize) {
        let at = DefinitionRef {
            block: self.block,
            definition: index,
        };
        self.trivia(out, definition.leading_trivia());
        self.skip_trivia = true;

        let mut wrapper = Element::span(definition_class(definition.kind));
        if definition.kind != DefinitionKind::Includes {
            if self.cx.plan.owns_name(at) {
                wrapper.set_attr("id", definition_wrapper_id(definition.name()));
            }
            wrapper.set_attr("data-title", definition.name());
        }

        if let Some(ext_attrs) = &definition.ext_attrs {
            self.ext_attrs(&mut wrapper, ext_attrs);
        }
        self.toks(&mut wrapper, &definition.keywords);

        match &definition.body {
            DefinitionBody::Members {
                open,
                members,
                close,
                semicolon,
            } => {
                self.definition_name(&mut wrapper, definition, at);
                if let Some(inheritance) = &definition.inheritance {
                    self.tok(&mut wrapper, &inheritance.colon);
                    let parent = definition.inherits_from().unwrap_or_default();
                    self.type_reference(&mut wrapper, &inheritance.name, parent, Some("idlSuperclass"));
                }
                self.tok(&mut wrapper, open);
                for (position, member) in members.iter().enumerate() {
                    let member_at = MemberRef {
                        block: self.block,
                        definition: index,
                        member: position,
                    };
                    if member.kind == MemberKind::EnumValue {
                        self.enum_value(&mut wrapper, definition, member, member_at);
                    } else {
                        self.member(&mut wrapper, definition, member, member_at);
                    }
                }
                self.tok(&mut wrapper, close);
                self.tok(&mut wrapper, semicolon);
            }
            DefinitionBody::Typedef {
                idl_type,
                semicolon,
            } => {
                self.outer_type(&mut wrapper, idl_type);
                self.definition_name(&mut wrapper, definition, at);
                self.tok(&mut wrapper, semicolon);
            }
            DefinitionBody::Callback {
                assign,
                return_type,
                arguments,
                semicolon,
            } => {
                self.definition_name(&mut wrapper, definition, at);
                self.tok(&mut wrapper, assign);
                self.outer_type(&mut wrapper, return_type);
                self.arguments(&mut wrapper, arguments);
                self.tok(&mut wrapper, semicolon);
            }
            DefinitionBody::Includes {
                keyword,
                mixin,
                semicolon,
            } => {
                self.type_reference(&mut wrapper, &definition.name, definition.name(), None);
                self.tok(&mut wrapper, keyword);
                let mixin_name = definition.included_mixin().unwrap_or_default();
                self.type_reference(&mut wrapper, mixin, mixin_name, None);
                self.tok(&mut wrapper, semicolon);
            }
        }
        out.push(wrapper.into());
    }

    fn definition_name(&mut self, out: &mut Element, definition: &Definition, at: DefinitionRef) {
        let name = definition.name();
        let tok = &definition.name;
        if definition.partial {
            self.trivia(out, &tok.trivia);
            let element = match self.resolve_type(name) {
                Resolution::Linked(target) => link_element(&target, Some("idlID"))
                    .attr("data-idl", IdlKind::Partial.as_str())
                    .attr("data-title", name),
                Resolution::Unresolved => Element::span("idlID")
                    .class(OFFENDING_CLASS)
                    .attr("title", format!("No definition found for partial `{name}`")),
            };
            out.push(text_element(element, &tok.value));
            return;
        }

        self.trivia(out, &tok.trivia);
        if let Some(annotation) = self.cx.claims.definition(at) {
            let link = Element::new(Tag::A)
                .class("idlID")
                .class("internalDFN")
                .attr("href", annotation.href())
                .attr(
                    "data-link-type",
                    annotation.dfn_type.map_or("dfn", |t| t.as_str()),
                );
            out.push(text_element(link, &tok.value));
            return;
        }

        let owner = self.cx.plan.owns_name(at);
        let mut dfn = Element::new(Tag::Dfn).class("idlID");
        if owner {
            dfn.set_attr("id", definition_anchor(name));
        }
        if let Some(dfn_type) = DfnType::of_definition(definition.kind) {
            dfn.set_attr("data-dfn-type", dfn_type.as_str());
        }
        if let Some(idl) = IdlKind::of_definition(definition.kind) {
            dfn.set_attr("data-idl", idl.as_str());
        }
        if owner {
            dfn.set_attr("data-export", "");
        }
        dfn.set_attr("data-title", name);
        out.push(text_element(dfn, &tok.value));
    }

    fn member(&mut self, out: &mut Element, definition: &Definition, member: &Member, at: MemberRef) {
        let mut wrapper = Element::span(member_class(member.kind));
        if let Some(name) = member.name() {
            let overload = self.cx.plan.overload(at);
            wrapper.set_attr("id", member_wrapper_id(&member.scope, name, overload));
            wrapper.set_attr("data-title", name);
        }
        if let Some(ext_attrs) = &member.ext_attrs {
            self.ext_attrs(&mut wrapper, ext_attrs);
        }

        match &member.body {
            MemberBody::Attribute {
                modifiers,
                keyword,
                idl_type,
                name,
                semicolon,
            } => {
                self.toks(&mut wrapper, modifiers);
                self.tok(&mut wrapper, keyword);
                self.outer_type(&mut wrapper, idl_type);
                self.member_name(&mut wrapper, definition, member, name, at);
                self.tok(&mut wrapper, semicolon);
            }
            MemberBody::Operation {
                modifiers,
                return_type,
                name,
                arguments,
                semicolon,
            } => {
                self.toks(&mut wrapper, modifiers);
                if let Some(ty) = return_type {
                    self.outer_type(&mut wrapper, ty);
                }
                if let Some(name) = name {
                    self.member_name(&mut wrapper, definition, member, name, at);
                }
                if let Some(arguments) = arguments {
                    self.arguments(&mut wrapper, arguments);
                }
                self.tok(&mut wrapper, semicolon);
            }
            MemberBody::Constructor {
                keyword,
                arguments,
                semicolon,
            } => {
                self.member_name(&mut wrapper, definition, member, keyword, at);
                self.arguments(&mut wrapper, arguments);
                self.tok(&mut wrapper, semicolon);
            }
            MemberBody::Constant {
                keyword,
                idl_type,
                name,
                assign,
                value,
                semicolon,
            } => {
                self.tok(&mut wrapper, keyword);
                self.outer_type(&mut wrapper, idl_type);
                self.member_name(&mut wrapper, definition, member, name, at);
                self.tok(&mut wrapper, assign);
                self.literal(&mut wrapper, value);
                self.tok(&mut wrapper, semicolon);
            }
            MemberBody::Field {
                required,
                idl_type,
                name,
                default,
                semicolon,
            } => {
                if let Some(required) = required {
                    self.tok(&mut wrapper, required);
                }
                self.outer_type(&mut wrapper, idl_type);
                self.member_name(&mut wrapper, definition, member, name, at);
                if let Some(default) = default {
                    self.default_value(&mut wrapper, default);
                }
                self.tok(&mut wrapper, semicolon);
            }
            MemberBody::Declaration {
                modifiers,
                keyword,
                open,
                types,
                separators,
                close,
                arguments,
                semicolon,
            } => {
                self.toks(&mut wrapper, modifiers);
                self.tok(&mut wrapper, keyword);
                self.tok(&mut wrapper, open);
                for (position, ty) in types.iter().enumerate() {
                    self.outer_type(&mut wrapper, ty);
                    if let Some(separator) = separators.get(position) {
                        self.tok(&mut wrapper, separator);
                    }
                }
                self.tok(&mut wrapper, close);
                if let Some(arguments) = arguments {
                    self.arguments(&mut wrapper, arguments);
                }
                self.tok(&mut wrapper, semicolon);
            }
            MemberBody::EnumValue { .. } => {}
        }
        out.push(wrapper.into());
    }

    /// The name of a member: a link to the host's dfn, or a self-defining `dfn`.
    fn member_name(
        &mut self,
        out: &mut Element,
        definition: &Definition,
        member: &Member,
        tok: &Tok,
        at: MemberRef,
    ) {
        self.trivia(out, &tok.trivia);
        out.push(self.member_name_element(definition, member, at, "idlName", &tok.value));
    }

    fn member_name_element(
        &self,
        definition: &Definition,
        member: &Member,
        at: MemberRef,
        class: &str,
        text: &str,
    ) -> Markup {
        let name = member.name().unwrap_or_default();
        if let Some(annotation) = self.cx.claims.member(at) {
            let link = Element::new(Tag::A)
                .class(class)
                .class("internalDFN")
                .attr("href", annotation.href())
                .attr(
                    "data-link-type",
                    annotation.dfn_type.map_or("dfn", |t| t.as_str()),
                )
                .attr("data-link-for", member.scope.clone());
            return text_element(link, text);
        }
        if member.kind == MemberKind::Operation && name == "toJSON" && member.has_ext_attr("Default") {
            let target = self.cx.resolver.default_tojson();
            return text_element(link_element(&target, Some(class)), text);
        }

        let overload = self.cx.plan.overload(at);
        let mut dfn = Element::new(Tag::Dfn)
            .class(class)
            .attr("id", member_anchor(&member.scope, name, overload));
        if let Some(dfn_type) = DfnType::of_member(member.kind) {
            dfn.set_attr("data-dfn-type", dfn_type.as_str());
        }
        dfn.set_attr("data-dfn-for", member.scope.clone());
        if let Some(idl) = IdlKind::of_member(member.kind) {
            dfn.set_attr("data-idl", idl.as_str());
        }
        if !definition.partial {
            dfn.set_attr("data-export", "");
        }
        text_element(dfn, text)
    }

    /// `"value"` with its trivia and separator outside the item.
    fn enum_value(&mut self, out: &mut Element, definition: &Definition, member: &Member, at: MemberRef) {
        let MemberBody::EnumValue { value, separator } = &member.body else {
            return;
        };
        self.trivia(out, &value.trivia);
        let inner = value
            .value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .unwrap_or(&value.value);
        let mut item = Element::span(member_class(member.kind))
            .attr("data-title", member.name().unwrap_or_default());
        item.text("\"");
        item.push(self.member_name_element(definition, member, at, "idlEnumValue", inner));
        item.text("\"");
        out.push(item.into());
        if let Some(separator) = separator {
            self.tok(out, separator);
        }
    }

    fn ext_attrs(&mut self, out: &mut Element, list: &ExtAttrList) {
        self.tok(out, &list.open);
        for (position, attr) in list.items.iter().enumerate() {
            self.ext_attr(out, attr);
            if let Some(separator) = list.separators.get(position) {
                self.tok(out, separator);
            }
        }
        self.tok(out, &list.close);
    }

    fn ext_attr(&mut self, out: &mut Element, attr: &ExtendedAttribute) {
        self.trivia(out, &attr.name.trivia);
        let mut span = Element::span("extAttr");
        match self.cx.resolver.resolve_extended_attribute(attr.name()) {
            Resolution::Linked(target) => {
                span.push(text_element(link_element(&target, None), &attr.name.value))
            }
            Resolution::Unresolved => span.text(&attr.name.value),
        }
        let names_globals = matches!(attr.name(), "Exposed" | "Global");
        if let Some(rhs) = &attr.rhs {
            self.tok(&mut span, &rhs.assign);
            match &rhs.value {
                ExtAttrValue::Identifier(tok) => self.ext_attr_identifier(&mut span, tok, names_globals),
                ExtAttrValue::List {
                    open,
                    items,
                    separators,
                    close,
                } => {
                    self.tok(&mut span, open);
                    for (position, item) in items.iter().enumerate() {
                        self.ext_attr_identifier(&mut span, item, names_globals);
                        if let Some(separator) = separators.get(position) {
                            self.tok(&mut span, separator);
                        }
                    }
                    self.tok(&mut span, close);
                }
                ExtAttrValue::String(tok)
                | ExtAttrValue::Integer(tok)
                | ExtAttrValue::Decimal(tok)
                | ExtAttrValue::Wildcard(tok) => self.tok(&mut span, tok),
            }
        }
        if let Some(arguments) = &attr.arguments {
            self.arguments(&mut span, arguments);
        }
        out.push(span.into());
    }

    fn ext_attr_identifier(&mut self, out: &mut Element, tok: &Tok, names_global: bool) {
        self.trivia(out, &tok.trivia);
        let resolution = if names_global {
            self.cx.resolver.resolve_global(&tok.value)
        } else {
            Resolution::Unresolved
        };
        match resolution {
            Resolution::Linked(target) => out.push(text_element(link_element(&target, None), &tok.value)),
            Resolution::Unresolved => out.text(&tok.value),
        }
    }

    fn arguments(&mut self, out: &mut Element, list: &ArgumentList) {
        self.tok(out, &list.open);
        for (position, argument) in list.arguments.iter().enumerate() {
            self.argument(out, argument);
            if let Some(separator) = list.separators.get(position) {
                self.tok(out, separator);
            }
        }
        self.tok(out, &list.close);
    }

    fn argument(&mut self, out: &mut Element, argument: &Argument) {
        let mut param = Element::span("idlParam");
        if let Some(ext_attrs) = &argument.ext_attrs {
            self.ext_attrs(&mut param, ext_attrs);
        }
        if let Some(optional) = &argument.optional {
            self.tok(&mut param, optional);
        }
        self.outer_type(&mut param, &argument.idl_type);
        if let Some(variadic) = &argument.variadic {
            self.tok(&mut param, variadic);
        }
        self.trivia(&mut param, &argument.name.trivia);
        param.push(text_element(Element::span("idlParamName"), &argument.name.value));
        if let Some(default) = &argument.default {
            self.default_value(&mut param, default);
        }
        out.push(param.into());
    }

    fn default_value(&mut self, out: &mut Element, default: &DefaultValue) {
        self.tok(out, &default.assign);
        self.literal(out, &default.literal);
    }

    /// A literal in `span.idlDefaultValue`, its leading trivia outside.
    fn literal(&mut self, out: &mut Element, literal: &Literal) {
        let Some((first, rest)) = literal.tokens.split_first() else {
            return;
        };
        self.trivia(out, &first.trivia);
        let mut span = Element::span("idlDefaultValue");
        span.text(&first.value);
        self.toks(&mut span, rest);
        out.push(span.into());
    }

    /// The outermost type of a member, argument or definition, in `span.idlType`.
    fn outer_type(&mut self, out: &mut Element, ty: &IdlType) {
        let mut span = Element::span("idlType");
        self.idl_type(&mut span, ty);
        out.push(span.into());
    }

    fn idl_type(&mut self, out: &mut Element, ty: &IdlType) {
        if let Some(ext_attrs) = &ty.ext_attrs {
            self.ext_attrs(out, ext_attrs);
        }
        match &ty.kind {
            TypeKind::Named { tokens, name } => {
                let Some((first, rest)) = tokens.split_first() else {
                    return;
                };
                self.trivia(out, &first.trivia);
                let mut text = first.value.clone();
                for tok in rest {
                    text.push_str(&tok.trivia);
                    text.push_str(&tok.value);
                }
                let name = idlweave_parser::ast::unescape(name);
                match self.resolve_type(name) {
                    Resolution::Linked(target) => out.push(text_element(link_element(&target, None), &text)),
                    Resolution::Unresolved => out.text(&text),
                }
            }
            TypeKind::Generic {
                name,
                open,
                arguments,
                separators,
                close,
            } => {
                self.type_reference(out, name, &name.value, None);
                self.tok(out, open);
                for (position, argument) in arguments.iter().enumerate() {
                    self.idl_type(out, argument);
                    if let Some(separator) = separators.get(position) {
                        self.tok(out, separator);
                    }
                }
                self.tok(out, close);
            }
            TypeKind::Union {
                open,
                members,
                separators,
                close,
            } => {
                self.tok(out, open);
                for (position, member) in members.iter().enumerate() {
                    self.idl_type(out, member);
                    if let Some(separator) = separators.get(position) {
                        self.tok(out, separator);
                    }
                }
                self.tok(out, close);
            }
            TypeKind::Nullable { inner, question } => {
                self.idl_type(out, inner);
                self.tok(out, question);
            }
        }
    }
}
