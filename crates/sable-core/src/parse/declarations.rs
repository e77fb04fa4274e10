// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Declaration parsing: the module walk and every top-level production.
//!
//! The module parser iterates the root token tree's children, classifies
//! each statement, and dispatches to the matching declaration parser.
//! Failures never abort the walk: each parser reports its diagnostic and
//! returns `None`, and the walk resumes at the next node so a single pass
//! surfaces as many faults as possible.

use crate::ast::{
    Alias, AliasTarget, Attribute, AttributeKind, Enum, Function, Import, Include, Module,
    Parameter, TypeInfo, Variable,
};
use crate::source_analysis::{Lexeme, Production, TokenNode, classify};

use super::{Parser, find_matching, join_texts, split_top_level, strip_terminator};

impl Parser {
    // ========================================================================
    // Module walk
    // ========================================================================

    /// Parses the root token tree into a [`Module`].
    ///
    /// Always returns a module; check the diagnostics context for faults.
    pub(crate) fn parse_module(&mut self, tree: &TokenNode) -> Module {
        let mut module = Module::new(self.source.clone());
        let mut seen_module_statement = false;

        for child in &tree.children {
            match classify(child) {
                Production::Module => {
                    self.parse_module_statement(&mut module, child, &mut seen_module_statement);
                }
                Production::Import => {
                    if let Some(import) = self.parse_import(child) {
                        module.imports.push(import);
                    }
                }
                Production::Include => {
                    if let Some(include) = self.parse_include(child) {
                        module.includes.push(include);
                    }
                }
                Production::Attribute => self.parse_attribute_statement(child),
                Production::Alias => {
                    if let Some(alias) = self.parse_alias(child) {
                        module.aliases.push(alias);
                    }
                }
                Production::Variable => {
                    if let Some(variable) = self.parse_variable(child) {
                        module.variables.push(variable);
                    }
                }
                Production::Enum => {
                    if let Some(parsed) = self.parse_enum(child) {
                        module.enums.push(parsed);
                    }
                }
                Production::Function => {
                    if let Some(function) = self.parse_function(child, false) {
                        module.functions.push(function);
                    }
                }
                Production::Internal => {
                    if let Some(function) = self.parse_function(child, true) {
                        module.internal_functions.push(function);
                    }
                }
                Production::This
                | Production::StaticThis
                | Production::Struct
                | Production::Interface
                | Production::Template
                | Production::Traits
                | Production::StaticIf
                | Production::StaticElse => {
                    let keyword = child.word(0).unwrap_or_default();
                    self.report(
                        child.line(),
                        format!("'{keyword}' declarations are not supported."),
                    );
                }
                Production::Empty => {
                    if child.is_block() {
                        self.report(child.line(), "Invalid declaration.");
                    }
                }
                _ => self.report(child.line(), "Invalid declaration."),
            }
        }

        module
    }

    // ========================================================================
    // Simple declarations
    // ========================================================================

    /// Parses `module <identifier> ;`. At most one per file.
    fn parse_module_statement(&mut self, module: &mut Module, node: &TokenNode, seen: &mut bool) {
        if *seen {
            self.report(
                node.line(),
                "Only one module statement is allowed per module.",
            );
            return;
        }

        let tokens = strip_terminator(&node.statement);
        let Some(name) = tokens.get(1) else {
            self.report(node.line(), "Missing name from module declaration.");
            return;
        };
        if tokens.len() > 2 {
            self.report(node.line(), "Invalid module declaration.");
            return;
        }
        if !self.validate_path(name.as_str(), name.line()) {
            return;
        }

        *seen = true;
        module.name = name.as_str().into();
        module.line = node.line();
        module.attributes = self.take_pending_attributes();
    }

    /// Parses `import <identifier> [ : member , member … ] ;`.
    fn parse_import(&mut self, node: &TokenNode) -> Option<Import> {
        let tokens = strip_terminator(&node.statement);
        let Some(path) = tokens.get(1) else {
            self.report(node.line(), "Missing name from import declaration.");
            return None;
        };
        if !self.validate_path(path.as_str(), path.line()) {
            return None;
        }

        let mut members = Vec::new();
        if let Some(colon) = tokens.get(2) {
            if !colon.is(":") {
                self.report(node.line(), "Invalid import declaration.");
                return None;
            }
            for group in split_top_level(&tokens[3..], ",") {
                let [member] = group else {
                    self.report(node.line(), "Missing member from import declaration.");
                    return None;
                };
                if !self.validate_identifier(member.as_str(), member.line()) {
                    return None;
                }
                members.push(member.as_str().into());
            }
        }

        Some(Import {
            path: path.as_str().into(),
            members,
            line: node.line(),
        })
    }

    /// Parses `include "<path>" ;`. The path must be a double-quoted string;
    /// it is stored without its quotes.
    fn parse_include(&mut self, node: &TokenNode) -> Option<Include> {
        let tokens = strip_terminator(&node.statement);
        let Some(path) = tokens.get(1) else {
            self.report(node.line(), "Missing path from include declaration.");
            return None;
        };
        if tokens.len() > 2 {
            self.report(node.line(), "Invalid include declaration.");
            return None;
        }
        if !path.is_string_literal() {
            self.report(
                path.line(),
                "Include path must be a double-quoted string.",
            );
            return None;
        }

        let text = path.as_str();
        Some(Include {
            path: text[1..text.len() - 1].into(),
            line: node.line(),
        })
    }

    /// Parses an attribute statement into the pending-attributes slot.
    ///
    /// Forms: a bare keyword `public:` or a constructor call
    /// `@Name(args):`.
    pub(crate) fn parse_attribute_statement(&mut self, node: &TokenNode) {
        let tokens = &node.statement;
        let line = node.line();

        // Bare keyword: `public :`
        if tokens.len() == 2 && tokens[1].is(":") {
            self.push_pending_attribute(Attribute {
                kind: AttributeKind::Keyword(tokens[0].as_str().into()),
                line,
            });
            return;
        }

        // Constructor call: `@ Name ( args ) :`
        if tokens.first().is_some_and(|t| t.is("@")) {
            let Some(name) = tokens.get(1) else {
                self.report(line, "Missing name from attribute declaration.");
                return;
            };
            if !self.validate_identifier(name.as_str(), name.line()) {
                return;
            }
            if tokens.get(2).is_none_or(|t| !t.is("(")) {
                self.report(line, "Missing '(' from attribute declaration.");
                return;
            }
            let Some(close) = find_matching(tokens, 2) else {
                self.report(line, "Missing ')' from attribute declaration.");
                return;
            };
            if tokens.get(close + 1).is_none_or(|t| !t.is(":")) || close + 2 != tokens.len() {
                self.report(line, "Invalid attribute declaration.");
                return;
            }

            let arguments = split_top_level(&tokens[3..close], ",")
                .iter()
                .filter(|group| !group.is_empty())
                .map(|group| join_texts(group))
                .collect();
            self.push_pending_attribute(Attribute {
                kind: AttributeKind::Constructor {
                    name: name.as_str().into(),
                    arguments,
                },
                line,
            });
            return;
        }

        self.report(line, "Invalid attribute declaration.");
    }

    /// Parses `alias <name> [ ( params ) ] = <RHS> ;`.
    ///
    /// The RHS is probed speculatively: first as a type expression, then as
    /// a value expression. Only when both probes fail are the queued
    /// diagnostics committed.
    fn parse_alias(&mut self, node: &TokenNode) -> Option<Alias> {
        let tokens = strip_terminator(&node.statement);
        let line = node.line();

        let Some(name) = tokens.get(1) else {
            self.report(line, "Missing name from alias declaration.");
            return None;
        };
        if !self.validate_identifier(name.as_str(), name.line()) {
            return None;
        }

        let mut next = 2;
        let mut parameters = Vec::new();
        if tokens.get(next).is_some_and(|t| t.is("(")) {
            let Some(close) = find_matching(tokens, next) else {
                self.report(line, "Missing ')' from alias declaration.");
                return None;
            };
            parameters = self.parse_parameters(&tokens[next + 1..close], true)?;
            next = close + 1;
        }

        if tokens.get(next).is_none_or(|t| !t.is("=")) {
            self.report(line, "Missing '=' from alias declaration.");
            return None;
        }
        let rhs = &tokens[next + 1..];
        if rhs.is_empty() {
            self.report(line, "Missing expression from alias declaration.");
            return None;
        }

        let target = if let Some(type_info) = self.speculate(|p| p.parse_type(rhs)) {
            self.clear_queued();
            AliasTarget::Type(type_info)
        } else {
            self.clear_queued();
            if let Some(expression) = self.speculate(|p| p.parse_expression(rhs, false)) {
                self.clear_queued();
                AliasTarget::Expression(expression)
            } else {
                if !self.flush_queued() {
                    self.report(line, "Invalid alias declaration.");
                }
                return None;
            }
        };

        Some(Alias {
            name: name.as_str().into(),
            parameters,
            target,
            attributes: self.take_pending_attributes(),
            line,
        })
    }

    // ========================================================================
    // Variables
    // ========================================================================

    /// Parses a `var` declaration node.
    pub(crate) fn parse_variable(&mut self, node: &TokenNode) -> Option<Variable> {
        self.parse_variable_tokens(&node.statement)
    }

    /// Parses `var [type] name [= expr] ;` from raw tokens.
    ///
    /// The leading `var` is optional so `for`-loop initializers can reuse
    /// this parser.
    pub(crate) fn parse_variable_tokens(&mut self, tokens: &[Lexeme]) -> Option<Variable> {
        let line = tokens.first().map_or(1, Lexeme::line);
        let tokens = strip_terminator(tokens);
        let tokens = match tokens.first() {
            Some(first) if first.is("var") => &tokens[1..],
            _ => tokens,
        };

        let groups = split_top_level(tokens, "=");
        let declaration = groups[0];
        let Some(name) = declaration.last() else {
            self.report(line, "Missing name from variable declaration.");
            return None;
        };
        if !self.validate_identifier(name.as_str(), name.line()) {
            return None;
        }

        let type_info = if declaration.len() > 1 {
            Some(self.parse_type(&declaration[..declaration.len() - 1])?)
        } else {
            None
        };

        let expression = if groups.len() > 1 {
            let rhs = &tokens[declaration.len() + 1..];
            if rhs.is_empty() {
                self.report(line, "Missing expression from variable declaration.");
                return None;
            }
            Some(self.parse_expression(rhs, false)?)
        } else {
            None
        };

        Some(Variable {
            name: name.as_str().into(),
            type_info,
            expression,
            attributes: self.take_pending_attributes(),
            line,
        })
    }

    // ========================================================================
    // Enums
    // ========================================================================

    /// Parses an enum in single-item or block form.
    fn parse_enum(&mut self, node: &TokenNode) -> Option<Enum> {
        let line = node.line();
        let header = strip_terminator(&node.statement);

        let Some(name) = header.get(1) else {
            self.report(line, "Missing name from enum declaration.");
            return None;
        };
        if !self.validate_identifier(name.as_str(), name.line()) {
            return None;
        }

        // Optional base type between `:` and `=` (or end of header).
        let mut next = 2;
        let mut base_type: Option<TypeInfo> = None;
        if header.get(next).is_some_and(|t| t.is(":")) {
            let end = header[next + 1..]
                .iter()
                .position(|t| t.is("="))
                .map_or(header.len(), |offset| next + 1 + offset);
            if next + 1 == end {
                self.report(line, "Missing type from enum declaration.");
                return None;
            }
            base_type = Some(self.parse_type(&header[next + 1..end])?);
            next = end;
        }

        if node.is_block() {
            if next != header.len() {
                self.report(line, "Invalid enum declaration.");
                return None;
            }
            let mut members = Vec::new();
            for child in node.inner_children() {
                if let Some(member) = self.parse_enum_member(child) {
                    members.push(member);
                }
            }
            return Some(Enum {
                name: name.as_str().into(),
                base_type,
                value: None,
                members,
                attributes: self.take_pending_attributes(),
                line,
            });
        }

        // Single-item form: `enum name [: type] = expr ;`
        if header.get(next).is_none_or(|t| !t.is("=")) {
            self.report(line, "Missing '=' from enum declaration.");
            return None;
        }
        let rhs = &header[next + 1..];
        if rhs.is_empty() {
            self.report(line, "Missing expression from enum declaration.");
            return None;
        }
        let value = self.parse_expression(rhs, false)?;

        Some(Enum {
            name: name.as_str().into(),
            base_type,
            value: Some(value),
            members: Vec::new(),
            attributes: self.take_pending_attributes(),
            line,
        })
    }

    /// Parses one block-form enum member: `name = expr ;`, as a variable.
    fn parse_enum_member(&mut self, node: &TokenNode) -> Option<Variable> {
        let tokens = strip_terminator(&node.statement);
        if tokens.is_empty() {
            return None;
        }
        if tokens.get(1).is_none_or(|t| !t.is("=")) {
            self.report(node.line(), "Missing '=' from enum member declaration.");
            return None;
        }
        self.parse_variable_tokens(&node.statement)
    }

    // ========================================================================
    // Functions
    // ========================================================================

    /// Parses a function declaration.
    ///
    /// `fn [returnType] name [(template-params)] (params) [{ body } | ;]`.
    /// With `internal` set, parses the forward-declaration form
    /// `internal fn … ;` which must not carry a body.
    pub(crate) fn parse_function(&mut self, node: &TokenNode, internal: bool) -> Option<Function> {
        let line = node.line();
        let mut tokens: &[Lexeme] = strip_terminator(&node.statement);

        if internal {
            if node.is_block() {
                self.report(line, "Invalid internal function declaration.");
                return None;
            }
            tokens = &tokens[1..]; // strip `internal`
        }
        if tokens.first().is_none_or(|t| !t.is("fn")) {
            self.report(line, "Missing 'fn' from function declaration.");
            return None;
        }
        tokens = &tokens[1..];

        let Some(open) = tokens.iter().position(|t| t.is("(")) else {
            self.report(line, "Missing '(' from function declaration.");
            return None;
        };
        let signature = &tokens[..open];
        let Some(name) = signature.last() else {
            self.report(line, "Missing name from function declaration.");
            return None;
        };
        if !self.validate_identifier(name.as_str(), name.line()) {
            return None;
        }
        let return_type = if signature.len() > 1 {
            self.parse_type(&signature[..signature.len() - 1])?
        } else {
            TypeInfo::void(line)
        };

        let Some(close) = find_matching(tokens, open) else {
            self.report(line, "Missing ')' from function declaration.");
            return None;
        };

        let mut template_parameters = Vec::new();
        let parameters;
        let params_end;
        if tokens.get(close + 1).is_some_and(|t| t.is("(")) {
            let Some(second_close) = find_matching(tokens, close + 1) else {
                self.report(line, "Missing ')' from function declaration.");
                return None;
            };
            template_parameters = self.parse_parameters(&tokens[open + 1..close], true)?;
            parameters = self.parse_parameters(&tokens[close + 2..second_close], false)?;
            params_end = second_close;
        } else {
            parameters = self.parse_parameters(&tokens[open + 1..close], false)?;
            params_end = close;
        }
        if params_end + 1 != tokens.len() {
            self.report(line, "Invalid function declaration.");
            return None;
        }

        let body = if internal || !node.is_block() {
            None
        } else {
            Some(self.parse_scope(node))
        };

        Some(Function {
            name: name.as_str().into(),
            return_type,
            template_parameters,
            parameters,
            body,
            attributes: self.take_pending_attributes(),
            line,
        })
    }

    /// Parses a comma-separated parameter list.
    ///
    /// Each parameter is `<type> <name>`; with `allow_untyped` (template
    /// lists) a bare identifier is accepted as a type-less parameter.
    fn parse_parameters(
        &mut self,
        tokens: &[Lexeme],
        allow_untyped: bool,
    ) -> Option<Vec<Parameter>> {
        if tokens.is_empty() {
            return Some(Vec::new());
        }

        let mut parameters = Vec::new();
        for group in split_top_level(tokens, ",") {
            let Some(name) = group.last() else {
                let line = tokens.first().map_or(1, Lexeme::line);
                self.report(line, "Missing parameter from function declaration.");
                return None;
            };
            if !self.validate_identifier(name.as_str(), name.line()) {
                return None;
            }

            let type_info = if group.len() == 1 {
                if !allow_untyped {
                    self.report(name.line(), "Missing type from parameter declaration.");
                    return None;
                }
                TypeInfo::void(name.line())
            } else {
                self.parse_type(&group[..group.len() - 1])?
            };

            parameters.push(Parameter {
                type_info,
                name: name.as_str().into(),
                line: name.line(),
            });
        }
        Some(parameters)
    }
}
