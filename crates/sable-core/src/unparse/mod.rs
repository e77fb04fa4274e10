// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! AST-to-source rendering.
//!
//! Renders a parsed [`Module`] back into Sable source text. The output is
//! normalized rather than byte-faithful: comments and original spacing are
//! gone (the lexer drops them), `void` return types print explicitly, and
//! dotted call heads print in call-chain form. What the renderer guarantees
//! is **reparse stability**: parsing the rendered text yields a module that
//! renders to the same text again. The round-trip tests at the bottom of
//! this file pin that property.
//!
//! # Example
//!
//! ```
//! use sable_core::parse_source;
//! use sable_core::unparse::unparse;
//!
//! let (module, _) = parse_source("m.sb", "module m; fn main(){ writeln(\"hi\"); }");
//! let rendered = unparse(&module);
//! assert!(rendered.contains("writeln(\"hi\");"));
//! ```

use std::fmt::Write;

use crate::ast::{
    Alias, AliasTarget, ArrayLiteral, AssignmentExpression, Attribute, AttributeKind, CallArgument,
    Enum, Expression, ExpressionToken, ForeachRange, Function, FunctionCall, Module, Parameter,
    ScopeEntry, ScopeItem, ScopeState, Variable,
};
use crate::source_analysis::Lexeme;

/// Renders a module back into source text.
#[must_use]
pub fn unparse(module: &Module) -> String {
    let mut unparser = Unparser::new();
    unparser.render_module(module);
    unparser.out
}

/// Rendering state: the output buffer and current indentation level.
struct Unparser {
    out: String,
    indent: usize,
}

impl Unparser {
    fn new() -> Self {
        Self {
            out: String::new(),
            indent: 0,
        }
    }

    /// Writes one indented line.
    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.out.push_str("    ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn render_module(&mut self, module: &Module) {
        self.render_attributes(&module.attributes);
        if !module.name.is_empty() {
            self.line(&format!("module {};", module.name));
        }

        for import in &module.imports {
            if import.members.is_empty() {
                self.line(&format!("import {};", import.path));
            } else {
                self.line(&format!(
                    "import {} : {};",
                    import.path,
                    import.members.iter().map(|m| m.as_str()).collect::<Vec<_>>().join(", ")
                ));
            }
        }
        for include in &module.includes {
            self.line(&format!("include \"{}\";", include.path));
        }
        for parsed in &module.enums {
            self.render_enum(parsed);
        }
        for alias in &module.aliases {
            self.render_alias(alias);
        }
        for variable in &module.variables {
            self.render_attributes(&variable.attributes);
            let rendered = render_variable(variable);
            self.line(&format!("{rendered};"));
        }
        for function in &module.internal_functions {
            self.render_attributes(&function.attributes);
            self.line(&format!("internal {};", render_signature(function)));
        }
        for function in &module.functions {
            self.render_function(function);
        }
    }

    fn render_attributes(&mut self, attributes: &[Attribute]) {
        for attribute in attributes {
            match &attribute.kind {
                AttributeKind::Keyword(keyword) => self.line(&format!("{keyword}:")),
                AttributeKind::Constructor { name, arguments } => {
                    self.line(&format!("@{name}({}):", arguments.iter().map(|a| a.as_str()).collect::<Vec<_>>().join(", ")));
                }
            }
        }
    }

    fn render_enum(&mut self, parsed: &Enum) {
        self.render_attributes(&parsed.attributes);
        let mut header = format!("enum {}", parsed.name);
        if let Some(base) = &parsed.base_type {
            let _ = write!(header, " : {base}");
        }
        if let Some(value) = &parsed.value {
            self.line(&format!("{header} = {};", render_expression(value)));
            return;
        }
        self.line(&format!("{header} {{"));
        self.indent += 1;
        for member in &parsed.members {
            let name = &member.name;
            match &member.expression {
                Some(expression) => {
                    self.line(&format!("{name} = {};", render_expression(expression)));
                }
                None => self.line(&format!("{name};")),
            }
        }
        self.indent -= 1;
        self.line("}");
    }

    fn render_alias(&mut self, alias: &Alias) {
        self.render_attributes(&alias.attributes);
        let mut header = format!("alias {}", alias.name);
        if !alias.parameters.is_empty() {
            let _ = write!(header, "({})", render_parameters(&alias.parameters));
        }
        let target = match &alias.target {
            AliasTarget::Type(type_info) => type_info.to_string(),
            AliasTarget::Expression(expression) => render_expression(expression).into(),
        };
        self.line(&format!("{header} = {target};"));
    }

    fn render_function(&mut self, function: &Function) {
        self.render_attributes(&function.attributes);
        let signature = render_signature(function);
        match &function.body {
            None => self.line(&format!("{signature};")),
            Some(body) => {
                self.line(&format!("{signature} {{"));
                self.indent += 1;
                self.render_scope(body);
                self.indent -= 1;
                self.line("}");
            }
        }
    }

    fn render_scope(&mut self, entries: &[ScopeEntry]) {
        for entry in entries {
            self.render_entry(entry);
        }
    }

    fn render_entry(&mut self, entry: &ScopeEntry) {
        let Some(item) = &entry.item else {
            match entry.state {
                ScopeState::Break => self.line("break;"),
                ScopeState::Continue => self.line("continue;"),
                ScopeState::End => self.line("end;"),
                ScopeState::Normal | ScopeState::Return => {}
            }
            return;
        };

        match item {
            ScopeItem::Variable(variable) => {
                self.render_attributes(&variable.attributes);
                let rendered = render_variable(variable);
                self.line(&format!("{rendered};"));
            }
            ScopeItem::Assignment(assignment) => {
                let rendered = render_assignment(assignment);
                self.line(&format!("{rendered};"));
            }
            ScopeItem::Call(call) => {
                let rendered = render_call(call);
                self.line(&format!("{rendered};"));
            }
            ScopeItem::Return(statement) => match &statement.expression {
                Some(expression) => {
                    self.line(&format!("return {};", render_expression(expression)));
                }
                None => self.line("return;"),
            },
            ScopeItem::If(statement) => {
                self.line(&format!("if {} {{", render_expression(&statement.condition)));
                self.indent += 1;
                self.render_scope(&statement.body);
                self.indent -= 1;
                self.line("}");
            }
            ScopeItem::Else(statement) => match &statement.if_branch {
                Some(nested) => {
                    self.line(&format!("else if {} {{", render_expression(&nested.condition)));
                    self.indent += 1;
                    self.render_scope(&nested.body);
                    self.indent -= 1;
                    self.line("}");
                }
                None => {
                    self.line("else {");
                    self.indent += 1;
                    self.render_scope(&statement.body);
                    self.indent -= 1;
                    self.line("}");
                }
            },
            ScopeItem::Switch(statement) => {
                self.line(&format!(
                    "switch {} {{",
                    render_expression(&statement.expression)
                ));
                self.indent += 1;
                for case in &statement.cases {
                    if case.is_range {
                        self.line(&format!("case {} .. {};", case.values[0], case.values[1]));
                    } else {
                        let values = case
                            .values
                            .iter()
                            .map(|v| v.as_str())
                            .collect::<Vec<_>>()
                            .join(", ");
                        self.line(&format!("case {values};"));
                    }
                    self.render_arm_body(&case.body);
                }
                if let Some(body) = &statement.default_case {
                    self.line("default;");
                    self.render_arm_body(body);
                }
                if let Some(body) = &statement.final_case {
                    self.line("final;");
                    self.render_arm_body(body);
                }
                self.indent -= 1;
                self.line("}");
            }
            ScopeItem::For(statement) => {
                self.line(&format!(
                    "for {} , {} , {} {{",
                    render_variable(&statement.initializer),
                    render_expression(&statement.condition),
                    render_assignment(&statement.post)
                ));
                self.indent += 1;
                self.render_scope(&statement.body);
                self.indent -= 1;
                self.line("}");
            }
            ScopeItem::Foreach(statement) => {
                let mut header = format!("foreach {}", statement.index);
                if let Some(second) = &statement.second_index {
                    let _ = write!(header, " , {second}");
                }
                let iterated = match &statement.iterated {
                    ForeachRange::Collection(name) => name.to_string(),
                    ForeachRange::Range { low, high } => format!("{low} .. {high}"),
                };
                self.line(&format!("{header} , {iterated} {{"));
                self.indent += 1;
                self.render_scope(&statement.body);
                self.indent -= 1;
                self.line("}");
            }
            ScopeItem::While(statement) => {
                if statement.is_do {
                    self.line("do {");
                    self.indent += 1;
                    self.render_scope(&statement.body);
                    self.indent -= 1;
                    self.line(&format!(
                        "}} while {};",
                        render_expression(&statement.condition)
                    ));
                } else {
                    self.line(&format!(
                        "while {} {{",
                        render_expression(&statement.condition)
                    ));
                    self.indent += 1;
                    self.render_scope(&statement.body);
                    self.indent -= 1;
                    self.line("}");
                }
            }
            ScopeItem::Scope(body) => {
                self.line("{");
                self.indent += 1;
                self.render_scope(body);
                self.indent -= 1;
                self.line("}");
            }
        }
    }

    fn render_arm_body(&mut self, body: &[ScopeEntry]) {
        self.line("{");
        self.indent += 1;
        self.render_scope(body);
        self.indent -= 1;
        self.line("}");
    }
}

fn render_signature(function: &Function) -> String {
    let mut signature = format!("fn {} {}", function.return_type, function.name);
    if !function.template_parameters.is_empty() {
        let _ = write!(
            signature,
            "({})",
            render_parameters(&function.template_parameters)
        );
    }
    let _ = write!(signature, "({})", render_parameters(&function.parameters));
    signature
}

/// Renders a parameter list. Untyped (template) parameters carry the `void`
/// placeholder and print as bare names.
fn render_parameters(parameters: &[Parameter]) -> String {
    parameters
        .iter()
        .map(|parameter| {
            if parameter.type_info == crate::ast::TypeInfo::void(parameter.type_info.line) {
                parameter.name.to_string()
            } else {
                format!("{} {}", parameter.type_info, parameter.name)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_variable(variable: &Variable) -> String {
    let mut rendered = String::from("var ");
    if let Some(type_info) = &variable.type_info {
        let _ = write!(rendered, "{type_info} ");
    }
    rendered.push_str(&variable.name);
    if let Some(expression) = &variable.expression {
        let _ = write!(rendered, " = {}", render_expression(expression));
    }
    rendered
}

fn render_assignment(assignment: &AssignmentExpression) -> String {
    let left = join_lexemes(&assignment.left_hand);
    if assignment.right_hand.is_empty() {
        return format!("{left}{}", assignment.operator);
    }
    format!(
        "{left} {} {}",
        assignment.operator,
        join_lexemes(&assignment.right_hand)
    )
}

fn render_expression(expression: &Expression) -> String {
    match expression {
        Expression::Array(array) => render_array(array),
        Expression::Tokens(tokens) => tokens
            .tokens
            .iter()
            .map(|token| match token {
                ExpressionToken::Atom(atom) => atom.as_str().to_string(),
                ExpressionToken::Call(call) => render_call(call),
            })
            .collect::<Vec<_>>()
            .join(" "),
    }
}

fn render_array(array: &ArrayLiteral) -> String {
    let entries: Vec<String> = array
        .values
        .iter()
        .map(|entry| {
            if array.is_associative {
                format!("{}: {}", entry[0], entry[1])
            } else {
                join_lexemes(entry)
            }
        })
        .collect();
    format!("[{}]", entries.join(", "))
}

fn render_call(call: &FunctionCall) -> String {
    let mut rendered = render_call_link(call);
    for link in &call.chain {
        rendered.push('.');
        rendered.push_str(&render_call_link(link));
    }
    rendered
}

fn render_call_link(call: &FunctionCall) -> String {
    let mut rendered = call.identifier.to_string();
    if !call.template_arguments.is_empty() {
        let _ = write!(
            rendered,
            "({})",
            call.template_arguments
                .iter()
                .map(|t| t.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    let arguments: Vec<String> = call
        .arguments
        .iter()
        .map(|argument| match argument {
            CallArgument::Raw(lexemes) => join_lexemes(lexemes),
            CallArgument::Array(array) => render_array(array),
        })
        .collect();
    let _ = write!(rendered, "({})", arguments.join(", "));
    rendered
}

fn join_lexemes(lexemes: &[Lexeme]) -> String {
    lexemes
        .iter()
        .map(Lexeme::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_source;

    fn parse_clean(source: &str) -> Module {
        let (module, diagnostics) = parse_source("test.sb", source);
        assert!(
            !diagnostics.has_errors(),
            "unexpected errors: {:?}",
            diagnostics.emitted()
        );
        module
    }

    /// Asserts the reparse-stability property: rendering, reparsing, and
    /// rendering again reproduces the first rendering exactly.
    fn assert_round_trip(source: &str) {
        let first = unparse(&parse_clean(source));
        let reparsed = parse_clean(&first);
        let second = unparse(&reparsed);
        assert_eq!(first, second, "render of reparse diverged for: {source}");
    }

    #[test]
    fn render_hello_world() {
        let rendered = unparse(&parse_clean(
            "module main; fn main(){ writeln(\"Hello\"); }",
        ));
        assert_eq!(
            rendered,
            "module main;\nfn void main() {\n    writeln(\"Hello\");\n}\n"
        );
    }

    #[test]
    fn round_trip_declarations() {
        assert_round_trip(
            "module app;\n\
             import collections : map, set;\n\
             include \"stdio.h\";\n\
             enum max : int = 100;\n\
             enum Color { red = 0; green = 1; }\n\
             alias numbers = int[];\n\
             alias two = 1 + 1;\n\
             var int counter = 0;\n\
             internal fn memcpy(ptr:void dest, ptr:void src);\n\
             fn int add(int a, int b){ return a + b; }",
        );
    }

    #[test]
    fn round_trip_control_flow() {
        assert_round_trip(
            "module flow;\n\
             fn run(){\n\
                 var total = 0;\n\
                 for var i = 0 , i < 10 , i++ {\n\
                     total += i;\n\
                 }\n\
                 while total > 0 {\n\
                     total -= 1;\n\
                     if total == 3 {\n\
                         break;\n\
                     } else {\n\
                         continue;\n\
                     }\n\
                 }\n\
                 do {\n\
                     total++;\n\
                 } while total < 5;\n\
                 foreach i , 0 .. 10 {\n\
                     writeln(i);\n\
                 }\n\
             }",
        );
    }

    #[test]
    fn round_trip_switch() {
        assert_round_trip(
            "module s;\n\
             fn pick(){\n\
                 switch x {\n\
                     case 0; { a(); }\n\
                     case 1, 2; { b(); }\n\
                     case 5 .. 9; { break; }\n\
                     default; { c(); }\n\
                     final; { d(); }\n\
                 }\n\
             }",
        );
    }

    #[test]
    fn round_trip_expressions_and_calls() {
        assert_round_trip(
            "module e;\n\
             fn run(){\n\
                 var m = [\"a\": 1, \"b\": 2];\n\
                 var list = [1, 2, 3];\n\
                 var y = f(1) + g(2);\n\
                 a.b().c(1, 2).d();\n\
                 var z = max(int)(a, b);\n\
             }",
        );
    }

    #[test]
    fn round_trip_attributes() {
        assert_round_trip(
            "module attrs;\n\
             public:\n\
             static:\n\
             fn f(){ }\n\
             @Remote(server, cached):\n\
             var x = 1;",
        );
    }

    #[test]
    fn round_trip_templates() {
        assert_round_trip("module t;\nfn T max(T)(T a, T b){ return a; }");
    }

    #[test]
    fn dotted_head_renders_as_chain() {
        let module = parse_clean("module m; fn f(){ a.b(1); }");
        let rendered = unparse(&module);
        assert!(rendered.contains("a().b(1);"), "rendered: {rendered}");
        // The chain form reparses to the same structure.
        assert_round_trip("module m; fn f(){ a.b(1); }");
    }

    #[test]
    fn do_while_renders_closer_form() {
        let rendered = unparse(&parse_clean("module m; fn f(){ do { i++; } while(i<10); }"));
        assert!(rendered.contains("do {"), "rendered: {rendered}");
        assert!(rendered.contains("} while ( i < 10 );"), "rendered: {rendered}");
    }
}
