/// A parsed expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// A numeric literal, e.g. `1`, `2.5`, `.5`.
    NumberLit(f64),
    /// A string literal, e.g. `'hello'`.
    StringLit(String),
    /// A reference to a PDV variable by name.
    VarRef(String),
    /// An array-element reference, e.g. `a{i}`.
    ArrayElemRef {
        /// The array name.
        name: String,
        /// The subscript expression.
        index: Box<Expr>,
    },
    /// A binary operator application.
    BinaryOp {
        /// The operator.
        op: BinOp,
        /// Left operand.
        lhs: Box<Expr>,
        /// Right operand.
        rhs: Box<Expr>,
    },
    /// A unary operator application.
    UnaryOp {
        /// The operator.
        op: UnOp,
        /// The operand.
        expr: Box<Expr>,
    },
    /// A function call, e.g. `SUBSTR(name, 1, 3)`.
    FunctionCall {
        /// The function name, uppercased.
        name: String,
        /// Argument expressions, in call order.
        args: Vec<Expr>,
    },
}

/// Binary operators, in the precedence order of spec §4.2 (lowest to
/// highest: `OR`, `AND`, comparison, additive, multiplicative,
/// exponentiation). `Concat` (`||`) binds as tightly as the additive
/// operators (see DESIGN.md's resolution of the open question on `||`
/// precedence).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BinOp {
    /// `OR`
    Or,
    /// `AND`
    And,
    /// `=` / `EQ`
    Eq,
    /// `<>`, `!=`, `NE`
    Ne,
    /// `<` / `LT`
    Lt,
    /// `<=` / `LE`
    Le,
    /// `>` / `GT`
    Gt,
    /// `>=` / `GE`
    Ge,
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `||` string concatenation
    Concat,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `**`
    Pow,
}

/// Unary operators.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum UnOp {
    /// Arithmetic negation `-x`.
    Neg,
    /// Logical negation `NOT x`.
    Not,
}
