// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Abstract Syntax Tree (AST) definitions for Sable.
//!
//! The AST represents one parsed module. Nodes form a plain owned tree with
//! [`Module`] as the root; there are no back-pointers and no reference
//! counting. Every node carries the 1-indexed source line it started on.
//!
//! # Design
//!
//! Sum shapes are tagged unions ([`ScopeItem`], [`Expression`],
//! [`AttributeKind`], [`TypeKind`]) so consumers pattern-match instead of
//! chasing nullable fields. The one deliberate exception is
//! [`ScopeEntry::item`]: a scope entry may consist of nothing but an
//! out-of-band scope state (`break;`, `continue;`), in which case `item` is
//! `None`.

use ecow::EcoString;

use crate::source_analysis::Lexeme;

/// Top-level container for one parsed Sable module.
///
/// List members preserve the source order of declarations.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Module {
    /// The module name from the `module` statement.
    pub name: EcoString,
    /// Label of the source file this module was parsed from.
    pub source: EcoString,
    /// Line of the `module` statement.
    pub line: u32,
    /// Attributes preceding the `module` statement.
    pub attributes: Vec<Attribute>,
    /// `import` declarations.
    pub imports: Vec<Import>,
    /// `include` declarations.
    pub includes: Vec<Include>,
    /// Function definitions (with bodies).
    pub functions: Vec<Function>,
    /// Forward declarations (`internal fn …;`, no body).
    pub internal_functions: Vec<Function>,
    /// Module-level variables.
    pub variables: Vec<Variable>,
    /// `alias` declarations.
    pub aliases: Vec<Alias>,
    /// `enum` declarations.
    pub enums: Vec<Enum>,
}

impl Module {
    /// Creates an empty module for the given source label.
    #[must_use]
    pub fn new(source: impl Into<EcoString>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }
}

/// An `import` declaration: module path plus optional selective members.
///
/// `import collections : map, set;` imports only `map` and `set`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// The imported module path identifier.
    pub path: EcoString,
    /// Selective member list following `:`; empty imports everything.
    pub members: Vec<EcoString>,
    /// Line of the declaration.
    pub line: u32,
}

/// An `include` declaration: a verbatim C-header path, quotes stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Include {
    /// The header path as written, without quotes.
    pub path: EcoString,
    /// Line of the declaration.
    pub line: u32,
}

/// An attribute buffered for the next declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// What kind of attribute this is.
    pub kind: AttributeKind,
    /// Line of the attribute statement.
    pub line: u32,
}

/// The two attribute forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeKind {
    /// A bare keyword attribute: `public`, `static`, `const`, …
    Keyword(EcoString),
    /// A constructor-call attribute: `@Name(args):`.
    Constructor {
        /// The constructor name following `@`.
        name: EcoString,
        /// Raw argument lexeme texts.
        arguments: Vec<EcoString>,
    },
}

/// A function definition or forward declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    /// The function name.
    pub name: EcoString,
    /// Return type; defaults to `void` when omitted.
    pub return_type: TypeInfo,
    /// Template parameter list, when a second parameter list was present.
    pub template_parameters: Vec<Parameter>,
    /// Value parameter list.
    pub parameters: Vec<Parameter>,
    /// Body scope; `None` for forward declarations.
    pub body: Option<Vec<ScopeEntry>>,
    /// Attributes claimed from the pending-attribute slot.
    pub attributes: Vec<Attribute>,
    /// Line of the declaration.
    pub line: u32,
}

/// A single function parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// The parameter type. Template parameters may be untyped, in which
    /// case this is the `void` placeholder.
    pub type_info: TypeInfo,
    /// The parameter name.
    pub name: EcoString,
    /// Line the parameter appeared on.
    pub line: u32,
}

/// Mutability attribute of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mutability {
    /// `immutable`
    Immutable,
    /// `const`
    Const,
    /// `mut`
    Mut,
}

impl Mutability {
    /// Parses a mutability keyword.
    #[must_use]
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "immutable" => Some(Self::Immutable),
            "const" => Some(Self::Const),
            "mut" => Some(Self::Mut),
            _ => None,
        }
    }

    /// The source keyword for this mutability.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Immutable => "immutable",
            Self::Const => "const",
            Self::Mut => "mut",
        }
    }
}

/// One accumulated entry of a composite type spread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeEntry {
    /// Whether a `ptr` prefix applied to this entry.
    pub is_pointer: bool,
    /// The base type name.
    pub base: EcoString,
    /// Mutability following the base, if any.
    pub mutability: Option<Mutability>,
}

/// The resolved shape of a parsed type expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    /// A flat scalar type: `int`.
    Scalar,
    /// A pointer type: `ptr:int`.
    Pointer,
    /// A dynamic array: `int[]`.
    DynamicArray,
    /// A static array with its element count: `int[10]`.
    StaticArray(u64),
    /// An associative array `V[K]`; the key type is `entries[1]`.
    Associative,
}

/// A fully parsed composite type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    /// Outer mutability of the type.
    pub mutability: Option<Mutability>,
    /// Whether the type carries a `ptr` prefix.
    pub is_pointer: bool,
    /// The base type name (the value type for arrays).
    pub base: EcoString,
    /// All accumulated entries; associative types have exactly two.
    pub entries: Vec<TypeEntry>,
    /// The resolved kind.
    pub kind: TypeKind,
    /// Line the type spread started on.
    pub line: u32,
}

impl TypeInfo {
    /// Creates a flat scalar type.
    #[must_use]
    pub fn scalar(base: impl Into<EcoString>, line: u32) -> Self {
        let base = base.into();
        Self {
            mutability: None,
            is_pointer: false,
            base: base.clone(),
            entries: vec![TypeEntry {
                is_pointer: false,
                base,
                mutability: None,
            }],
            kind: TypeKind::Scalar,
            line,
        }
    }

    /// The implicit `void` return type.
    #[must_use]
    pub fn void(line: u32) -> Self {
        Self::scalar("void", line)
    }
}

impl std::fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_pointer {
            write!(f, "ptr:")?;
        }
        write!(f, "{}", self.base)?;
        match &self.kind {
            TypeKind::Scalar | TypeKind::Pointer => {}
            TypeKind::DynamicArray => write!(f, "[]")?,
            TypeKind::StaticArray(size) => write!(f, "[{size}]")?,
            TypeKind::Associative => {
                write!(f, "[")?;
                if let Some(key) = self.entries.get(1) {
                    if key.is_pointer {
                        write!(f, "ptr:")?;
                    }
                    write!(f, "{}", key.base)?;
                    if let Some(mutability) = key.mutability {
                        write!(f, ":{}", mutability.as_str())?;
                    }
                }
                write!(f, "]")?;
            }
        }
        if let Some(mutability) = self.mutability {
            write!(f, ":{}", mutability.as_str())?;
        }
        Ok(())
    }
}

/// A parsed right-hand-side expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// An array or associative-array literal.
    Array(ArrayLiteral),
    /// A mathematical-or-boolean token expression.
    Tokens(TokenExpression),
}

impl Expression {
    /// Returns the array literal, if this expression is one.
    #[must_use]
    pub fn as_array(&self) -> Option<&ArrayLiteral> {
        match self {
            Self::Array(array) => Some(array),
            Self::Tokens(_) => None,
        }
    }

    /// Returns the token expression, if this expression is one.
    #[must_use]
    pub fn as_tokens(&self) -> Option<&TokenExpression> {
        match self {
            Self::Tokens(tokens) => Some(tokens),
            Self::Array(_) => None,
        }
    }
}

/// An array literal: `[1, 2, 3]` or `["a": 1, "b": 2]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayLiteral {
    /// Whether a `:` before the first `,` marked the literal associative.
    pub is_associative: bool,
    /// Ordered entries. Associative entries hold exactly two sub-tokens
    /// (key and value); plain entries hold the comma-separated token group.
    pub values: Vec<Vec<Lexeme>>,
    /// Line the literal opened on.
    pub line: u32,
}

/// A mathematical or boolean expression as a validated token sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenExpression {
    /// The expression tokens in source order.
    pub tokens: Vec<ExpressionToken>,
    /// `true` for mathematical mode, `false` for boolean mode. Inferred from
    /// the operators present unless the caller forced boolean.
    pub is_mathematical: bool,
    /// Line the expression started on.
    pub line: u32,
}

/// One element of a token expression.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionToken {
    /// An identifier, literal, or symbol group.
    Atom(Lexeme),
    /// An embedded function call.
    Call(FunctionCall),
}

/// A function call, possibly templated and possibly chained.
///
/// A dotted head such as `a.b()` is represented as a degenerate head call
/// `a` (no arguments of its own) whose chain begins with `b()`.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    /// The called identifier.
    pub identifier: EcoString,
    /// Template arguments from a leading `(…)(…)` pair.
    pub template_arguments: Vec<EcoString>,
    /// Call arguments.
    pub arguments: Vec<CallArgument>,
    /// Further dot-joined calls hanging off this one.
    pub chain: Vec<FunctionCall>,
    /// Line of the call.
    pub line: u32,
}

impl FunctionCall {
    /// Creates a degenerate call with no argument list of its own
    /// (the head of a dotted chain).
    #[must_use]
    pub fn degenerate(identifier: impl Into<EcoString>, line: u32) -> Self {
        Self {
            identifier: identifier.into(),
            template_arguments: Vec::new(),
            arguments: Vec::new(),
            chain: Vec::new(),
            line,
        }
    }
}

/// A single argument of a function call.
#[derive(Debug, Clone, PartialEq)]
pub enum CallArgument {
    /// Raw parameter tokens, exactly as written.
    Raw(Vec<Lexeme>),
    /// An array-literal argument, absorbed atomically.
    Array(ArrayLiteral),
}

impl CallArgument {
    /// The argument rendered as space-joined text.
    #[must_use]
    pub fn text(&self) -> EcoString {
        match self {
            Self::Raw(lexemes) => {
                let mut text = String::new();
                for (i, lexeme) in lexemes.iter().enumerate() {
                    if i > 0 {
                        text.push(' ');
                    }
                    text.push_str(lexeme.as_str());
                }
                text.into()
            }
            Self::Array(_) => "[…]".into(),
        }
    }
}

/// An assignment statement inside a scope.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentExpression {
    /// Left-hand token sequence.
    pub left_hand: Vec<Lexeme>,
    /// The assignment operator.
    pub operator: EcoString,
    /// Right-hand token sequence; empty for unary `++`/`--`.
    pub right_hand: Vec<Lexeme>,
    /// The parsed right-hand expression; `None` for unary `++`/`--`.
    pub right_hand_expression: Option<Expression>,
    /// Line of the statement.
    pub line: u32,
}

/// A `return` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStatement {
    /// The returned expression, if any.
    pub expression: Option<Expression>,
    /// Line of the statement.
    pub line: u32,
}

/// A module-level or scope-level variable declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    /// The variable name.
    pub name: EcoString,
    /// Declared type, when present.
    pub type_info: Option<TypeInfo>,
    /// Initializer expression, when present.
    pub expression: Option<Expression>,
    /// Attributes claimed from the pending-attribute slot.
    pub attributes: Vec<Attribute>,
    /// Line of the declaration.
    pub line: u32,
}

/// An `alias` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Alias {
    /// The alias name.
    pub name: EcoString,
    /// Optional parameter list.
    pub parameters: Vec<Parameter>,
    /// What the alias stands for.
    pub target: AliasTarget,
    /// Attributes claimed from the pending-attribute slot.
    pub attributes: Vec<Attribute>,
    /// Line of the declaration.
    pub line: u32,
}

/// The right-hand side of an alias: an expression or a type.
#[derive(Debug, Clone, PartialEq)]
pub enum AliasTarget {
    /// `alias two = 1 + 1;`
    Expression(Expression),
    /// `alias ints = int[];`
    Type(TypeInfo),
}

/// An `enum` declaration (single-item or block form).
#[derive(Debug, Clone, PartialEq)]
pub struct Enum {
    /// The enum name.
    pub name: EcoString,
    /// Base type following `:`, when present.
    pub base_type: Option<TypeInfo>,
    /// Single-item form: `enum max = 100;`.
    pub value: Option<Expression>,
    /// Block form members, each parsed as a variable.
    pub members: Vec<Variable>,
    /// Attributes claimed from the pending-attribute slot.
    pub attributes: Vec<Attribute>,
    /// Line of the declaration.
    pub line: u32,
}

/// An `if` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement {
    /// The condition, parsed in forced-boolean mode.
    pub condition: Expression,
    /// The body scope.
    pub body: Vec<ScopeEntry>,
    /// Line of the statement.
    pub line: u32,
}

/// An `else` or `else if` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ElseStatement {
    /// `else if …` recursion; `None` for a plain `else`.
    pub if_branch: Option<Box<IfStatement>>,
    /// The body scope of a plain `else`; empty when `if_branch` is set.
    pub body: Vec<ScopeEntry>,
    /// Line of the statement.
    pub line: u32,
}

/// A `switch` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchStatement {
    /// The switched expression.
    pub expression: Expression,
    /// The ordered `case` arms.
    pub cases: Vec<SwitchCase>,
    /// The `default` arm body, at most one.
    pub default_case: Option<Vec<ScopeEntry>>,
    /// The `final` arm body, at most one.
    pub final_case: Option<Vec<ScopeEntry>>,
    /// Line of the statement.
    pub line: u32,
}

/// One `case` arm of a switch.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    /// The matched values. A range arm holds exactly two: low and high.
    pub values: Vec<EcoString>,
    /// `true` for a `low .. high` range (inclusive low, exclusive high).
    pub is_range: bool,
    /// The arm's body scope.
    pub body: Vec<ScopeEntry>,
    /// Line of the arm.
    pub line: u32,
}

/// A `for` loop: `for init , cond , post { body }`.
#[derive(Debug, Clone, PartialEq)]
pub struct ForStatement {
    /// The loop variable initializer.
    pub initializer: Variable,
    /// The loop condition, forced boolean.
    pub condition: Expression,
    /// The post-iteration assignment.
    pub post: AssignmentExpression,
    /// The body scope.
    pub body: Vec<ScopeEntry>,
    /// Line of the statement.
    pub line: u32,
}

/// A `foreach` loop over a collection or range.
#[derive(Debug, Clone, PartialEq)]
pub struct ForeachStatement {
    /// The (first) index variable.
    pub index: EcoString,
    /// The optional second index variable.
    pub second_index: Option<EcoString>,
    /// What is being iterated.
    pub iterated: ForeachRange,
    /// The body scope.
    pub body: Vec<ScopeEntry>,
    /// Line of the statement.
    pub line: u32,
}

/// The iterable of a foreach: a named collection or a `low .. high` range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForeachRange {
    /// Iterate a named collection.
    Collection(EcoString),
    /// Iterate an integer range, inclusive low and exclusive high.
    Range {
        /// Lower bound.
        low: EcoString,
        /// Upper bound.
        high: EcoString,
    },
}

/// A `while` or `do … while` loop.
#[derive(Debug, Clone, PartialEq)]
pub struct WhileStatement {
    /// The loop condition, forced boolean.
    pub condition: Expression,
    /// The body scope.
    pub body: Vec<ScopeEntry>,
    /// `true` when this loop was formed from a cached `do` body.
    pub is_do: bool,
    /// Line of the statement.
    pub line: u32,
}

/// How a scope item terminates the containing control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScopeState {
    /// Ordinary statement.
    #[default]
    Normal,
    /// `break;`
    Break,
    /// `continue;`
    Continue,
    /// `end;`, reserved for later phases.
    End,
    /// `return …;`
    Return,
}

/// One statement of a parsed scope.
///
/// `item` is `None` for pure scope-state statements (`break;`,
/// `continue;`), which exist only to terminate the containing control flow.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeEntry {
    /// The parsed statement, if it produced one.
    pub item: Option<ScopeItem>,
    /// Out-of-band scope state.
    pub state: ScopeState,
    /// Line of the statement.
    pub line: u32,
}

impl ScopeEntry {
    /// Creates an ordinary entry holding an item.
    #[must_use]
    pub fn item(item: ScopeItem, line: u32) -> Self {
        Self {
            item: Some(item),
            state: ScopeState::Normal,
            line,
        }
    }

    /// Creates a pure scope-state entry with no item.
    #[must_use]
    pub fn state(state: ScopeState, line: u32) -> Self {
        Self {
            item: None,
            state,
            line,
        }
    }
}

/// The tagged union of statements a scope can contain.
#[derive(Debug, Clone, PartialEq)]
pub enum ScopeItem {
    /// An assignment statement.
    Assignment(AssignmentExpression),
    /// A bare function-call statement.
    Call(FunctionCall),
    /// A `return` statement.
    Return(ReturnStatement),
    /// A local variable declaration.
    Variable(Variable),
    /// An `if` statement.
    If(IfStatement),
    /// An `else` / `else if` statement.
    Else(ElseStatement),
    /// A `switch` statement.
    Switch(SwitchStatement),
    /// A `for` loop.
    For(ForStatement),
    /// A `foreach` loop.
    Foreach(ForeachStatement),
    /// A `while` or do-while loop.
    While(WhileStatement),
    /// A bare nested scope.
    Scope(Vec<ScopeEntry>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_info_display() {
        assert_eq!(TypeInfo::scalar("int", 1).to_string(), "int");
        assert_eq!(TypeInfo::void(1).to_string(), "void");

        let pointer = TypeInfo {
            is_pointer: true,
            kind: TypeKind::Pointer,
            ..TypeInfo::scalar("int", 1)
        };
        assert_eq!(pointer.to_string(), "ptr:int");

        let array = TypeInfo {
            kind: TypeKind::StaticArray(10),
            mutability: Some(Mutability::Const),
            ..TypeInfo::scalar("int", 1)
        };
        assert_eq!(array.to_string(), "int[10]:const");
    }

    #[test]
    fn mutability_keywords_round_trip() {
        for keyword in ["immutable", "const", "mut"] {
            let mutability = Mutability::from_keyword(keyword).expect("keyword");
            assert_eq!(mutability.as_str(), keyword);
        }
        assert_eq!(Mutability::from_keyword("static"), None);
    }

    #[test]
    fn scope_entry_constructors() {
        let entry = ScopeEntry::state(ScopeState::Break, 4);
        assert!(entry.item.is_none());
        assert_eq!(entry.state, ScopeState::Break);

        let entry = ScopeEntry::item(
            ScopeItem::Return(ReturnStatement {
                expression: None,
                line: 5,
            }),
            5,
        );
        assert!(entry.item.is_some());
        assert_eq!(entry.state, ScopeState::Normal);
    }

    #[test]
    fn call_argument_text() {
        let raw = CallArgument::Raw(vec![Lexeme::new("1", 1), Lexeme::new("+", 1), Lexeme::new("2", 1)]);
        assert_eq!(raw.text(), "1 + 2");
    }
}
