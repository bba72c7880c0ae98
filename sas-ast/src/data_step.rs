use crate::expr::Expr;
use crate::program::QualifiedName;

/// A statement that may appear in a DATA step body (spec §3, §4.3).
#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    /// `target = expr;`
    Assign {
        /// The assignment target.
        target: AssignTarget,
        /// The right-hand side.
        value: Expr,
    },
    /// `SET ds1 ds2 ...;` — concatenate input datasets.
    Set(Vec<QualifiedName>),
    /// `MERGE ds1 ds2 ...;` — BY-group merge of input datasets.
    Merge(Vec<QualifiedName>),
    /// `BY var1 var2 ...;`
    By(Vec<String>),
    /// `INPUT var [$] ...;`
    Input(Vec<InputVarSpec>),
    /// `DATALINES; ... ;` — the raw lines between the two `;`, as produced
    /// by the lexer's line-buffered mode.
    Datalines(Vec<String>),
    /// `OUTPUT;`
    Output,
    /// `IF cond THEN then_branch [ELSE else_branch]`. An `ELSE IF` chain is
    /// represented by nesting another single-element `IfThenElse` inside
    /// `else_branch`.
    IfThenElse {
        /// The condition.
        cond: Expr,
        /// Statement(s) run when `cond` is true.
        then_branch: Vec<Statement>,
        /// Statement(s) run otherwise, if any.
        else_branch: Option<Vec<Statement>>,
    },
    /// `DO var = start TO end [BY step]; ... END;`
    DoIndexed {
        /// The induction variable (an ordinary PDV variable).
        var: String,
        /// Loop start.
        start: Expr,
        /// Loop end (inclusive).
        end: Expr,
        /// Step, defaulting to `1`.
        by: Option<Expr>,
        /// Loop body.
        body: Vec<Statement>,
    },
    /// `DO WHILE (cond); ... END;` — pre-test loop.
    DoWhile {
        /// The loop condition.
        cond: Expr,
        /// Loop body.
        body: Vec<Statement>,
    },
    /// `DO UNTIL (cond); ... END;` — post-test loop.
    DoUntil {
        /// The loop condition.
        cond: Expr,
        /// Loop body.
        body: Vec<Statement>,
    },
    /// A bare `DO; ... END;` block, or the block form of an IF branch.
    Block(Vec<Statement>),
    /// `LEAVE;` — exits the innermost enclosing DO.
    Leave,
    /// `CONTINUE;` — jumps to the next iteration of the innermost DO.
    Continue,
    /// `DROP var1 var2 ...;`
    Drop(Vec<String>),
    /// `KEEP var1 var2 ...;`
    Keep(Vec<String>),
    /// `RETAIN var1 [init1] var2 [init2] ...;`
    Retain(Vec<RetainSpec>),
    /// `ARRAY name {size} var1 var2 ...;`
    Array(ArrayDecl),
    /// `LABEL var1='label1' var2='label2' ...;`
    Label(Vec<(String, String)>),
    /// `LENGTH var1 [$]n1 var2 [$]n2 ...;`
    Length(Vec<LengthSpec>),
    /// `FORMAT var1 fmt1 var2 fmt2 ...;`
    Format(Vec<(String, String)>),
    /// `INFORMAT var1 fmt1 var2 fmt2 ...;`
    Informat(Vec<(String, String)>),
    /// An empty statement (a stray `;`).
    Null,
}

/// The target of an assignment: a plain variable or an array element.
#[derive(Clone, Debug, PartialEq)]
pub enum AssignTarget {
    /// `var = ...`
    Variable(String),
    /// `arr{index} = ...`
    ArrayElem {
        /// The array name.
        name: String,
        /// The subscript expression.
        index: Expr,
    },
}

/// One `INPUT` variable: name plus whether it is read as character (`$`
/// suffix) or numeric.
#[derive(Clone, Debug, PartialEq)]
pub struct InputVarSpec {
    /// The variable name.
    pub name: String,
    /// `true` for `name$`.
    pub is_char: bool,
}

/// One `RETAIN` variable, with an optional initial value (defaults to
/// missing if omitted).
#[derive(Clone, Debug, PartialEq)]
pub struct RetainSpec {
    /// The variable name.
    pub name: String,
    /// The initial value expression, if given.
    pub initial: Option<Expr>,
}

/// `LENGTH var [$]n`: `is_char` is set by a leading `$`.
#[derive(Clone, Debug, PartialEq)]
pub struct LengthSpec {
    /// The variable name.
    pub name: String,
    /// `true` for a character variable (`$n`), `false` for numeric.
    pub is_char: bool,
    /// The declared byte length.
    pub length: u32,
}

/// `ARRAY name {size} var1 var2 ...;`
#[derive(Clone, Debug, PartialEq)]
pub struct ArrayDecl {
    /// The array name.
    pub name: String,
    /// The declared size; must equal `vars.len()`.
    pub size: usize,
    /// The PDV variables this array aliases, in index order.
    pub vars: Vec<String>,
}
