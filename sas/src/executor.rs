//! The DATA step executor (spec §4.3): pre-scan, row-source selection, and
//! the per-row Reset/Load/Execute/Output protocol.

use std::collections::{HashMap, HashSet};

use sas_ast::{ArrayDecl, AssignTarget, DataStepStmt, Expr, LengthSpec, RetainSpec, Statement};
use sas_core::{Cell, CoreError, Dataset, Environment, Pdv, StringInterner, VarMeta};

use crate::eval::{eval, EvalContext};

/// Runs one `DATA ... RUN;` step against `env`, storing the resulting
/// dataset under the step's name — unless a step-level error aborts it, in
/// which case no output is stored (spec §4.3.6: "discard partial output").
pub fn run_data_step(step: &DataStepStmt, env: &mut Environment) -> Result<(), CoreError> {
    let keep_or_drop = dataset_options_keep_drop(&step.options);

    let mut pdv = Pdv::new();
    let mut arrays: HashMap<String, Vec<String>> = HashMap::new();
    let mut drop: HashSet<String> = HashSet::new();
    let mut keep: Option<HashSet<String>> = None;
    if let Some((k, d)) = keep_or_drop {
        keep = k;
        drop = d;
    }

    let source = RowSource::from_body(&step.body, env, &mut pdv)?;
    prescan(&step.body, &mut pdv, &mut arrays, &mut drop, &mut keep, &mut env.interner);
    let output_seen_anywhere = contains_output(&step.body);

    let output_key = env.qualify(step.name.library.as_deref(), &step.name.name);
    let mut output = Dataset::new(output_key.clone());
    let state = StepState { arrays, drop, keep };

    let result = run_rows(&step.body, &mut pdv, &state, source, output_seen_anywhere, &mut env.interner, &mut output);

    match result {
        Ok(()) => {
            env.store_dataset(step.name.library.as_deref(), &step.name.name, output);
            Ok(())
        }
        Err(err) => {
            tracing::warn!(dataset = %output_key, error = %err, "DATA step aborted, no output stored");
            Err(err)
        }
    }
}

fn dataset_options_keep_drop(
    options: &[(String, String)],
) -> Option<(Option<HashSet<String>>, HashSet<String>)> {
    let mut keep = None;
    let mut drop = HashSet::new();
    let mut found = false;
    for (name, value) in options {
        match name.as_str() {
            "KEEP" => {
                found = true;
                keep = Some(value.split_whitespace().map(|s| s.to_ascii_uppercase()).collect());
            }
            "DROP" => {
                found = true;
                drop = value.split_whitespace().map(|s| s.to_ascii_uppercase()).collect();
            }
            _ => {}
        }
    }
    found.then_some((keep, drop))
}

struct StepState {
    arrays: HashMap<String, Vec<String>>,
    drop: HashSet<String>,
    keep: Option<HashSet<String>>,
}

impl StepState {
    /// Whether `name` (already canonical) belongs on the output dataset. The
    /// output column list is the PDV's columns filtered by DROP/KEEP; when
    /// both appear, KEEP wins (spec §4.3: "the output Dataset's column list
    /// is initialized to mirror the PDV, minus DROPped variables... if both
    /// appear, KEEP wins"). This applies to the output side only — the
    /// input-load side (SET/MERGE) is unaffected by DROP/KEEP on the step's
    /// own dataset options (an open question resolved in DESIGN.md).
    fn is_output_var(&self, name: &str) -> bool {
        if name.starts_with("FIRST.") || name.starts_with("LAST.") {
            // Automatic BY-group markers, like `_N_`/`_ERROR_`, never
            // become a dataset column.
            return false;
        }
        match &self.keep {
            Some(keep) => keep.contains(name),
            None => !self.drop.contains(name),
        }
    }
}

/// Control flow signal bubbling up out of statement execution.
enum Flow {
    Normal,
    Leave,
    ContinueLoop,
}

struct RowCtx<'a> {
    pdv: &'a mut Pdv,
    state: &'a StepState,
    interner: &'a mut StringInterner,
    output: &'a mut Dataset,
    output_happened: &'a mut bool,
}

struct PdvEvalContext<'a> {
    pdv: &'a Pdv,
    arrays: &'a HashMap<String, Vec<String>>,
}

impl EvalContext for PdvEvalContext<'_> {
    fn var(&self, name: &str) -> Cell {
        match name.to_ascii_uppercase().as_str() {
            "_N_" => Cell::Number(self.pdv.n as f64),
            "_ERROR_" => Cell::Number(if self.pdv.error { 1.0 } else { 0.0 }),
            _ => self.pdv.get(name).unwrap_or(Cell::MISSING_NUMBER),
        }
    }

    fn array_elem(&self, name: &str, index: i64) -> Result<Cell, CoreError> {
        let vars = self
            .arrays
            .get(&name.to_ascii_uppercase())
            .ok_or_else(|| CoreError::UndefinedArray(name.to_string()))?;
        if index < 1 || index as usize > vars.len() {
            return Err(CoreError::ArrayBounds {
                array: name.to_string(),
                size: vars.len(),
                index,
            });
        }
        Ok(self.pdv.get(&vars[index as usize - 1]).unwrap_or(Cell::MISSING_NUMBER))
    }
}

fn eval_soft(expr: &Expr, ctx: &mut RowCtx) -> Cell {
    let eval_ctx = PdvEvalContext { pdv: &*ctx.pdv, arrays: &ctx.state.arrays };
    match eval(expr, &eval_ctx, ctx.interner) {
        Ok(cell) => cell,
        Err(err) => {
            tracing::warn!(error = %err, "expression evaluation failed, row marked in error");
            ctx.pdv.error = true;
            Cell::MISSING_NUMBER
        }
    }
}

fn eval_num_soft(expr: &Expr, ctx: &mut RowCtx) -> f64 {
    let cell = eval_soft(expr, ctx);
    cell.to_number(ctx.interner)
}

fn eval_bool_soft(expr: &Expr, ctx: &mut RowCtx) -> bool {
    let cell = eval_soft(expr, ctx);
    cell.is_truthy(ctx.interner)
}

fn set_with_length_enforcement(pdv: &mut Pdv, idx: usize, value: Cell, interner: &mut StringInterner) {
    let length = pdv.vars()[idx].length;
    if length > 0 {
        if let Cell::Str(sym) = value {
            let text = interner.resolve(sym).to_string();
            if text.chars().count() > length as usize {
                let name = pdv.vars()[idx].name.clone();
                tracing::warn!(variable = %name, length, "value truncated to declared LENGTH");
                let truncated: String = text.chars().take(length as usize).collect();
                pdv.set_value(idx, Cell::from_str(interner, &truncated));
                return;
            }
        }
    }
    pdv.set_value(idx, value);
}

fn assign_to_target(target: &AssignTarget, value: Cell, ctx: &mut RowCtx) -> Result<(), CoreError> {
    match target {
        AssignTarget::Variable(name) => {
            let idx = ctx.pdv.declare(name, value.is_string());
            set_with_length_enforcement(ctx.pdv, idx, value, ctx.interner);
            Ok(())
        }
        AssignTarget::ArrayElem { name, index } => {
            let idx_cell = eval_soft(index, ctx);
            let idx_num = idx_cell.to_number(ctx.interner);
            if idx_num.is_nan() {
                return Ok(());
            }
            let i = idx_num as i64;
            let vars = ctx
                .state
                .arrays
                .get(&name.to_ascii_uppercase())
                .ok_or_else(|| CoreError::UndefinedArray(name.clone()))?;
            if i < 1 || i as usize > vars.len() {
                return Err(CoreError::ArrayBounds { array: name.clone(), size: vars.len(), index: i });
            }
            let var_name = vars[i as usize - 1].clone();
            let var_idx = ctx.pdv.index_of(&var_name).expect("array backing var predeclared");
            set_with_length_enforcement(ctx.pdv, var_idx, value, ctx.interner);
            Ok(())
        }
    }
}

fn sync_and_emit(pdv: &Pdv, state: &StepState, output: &mut Dataset) {
    for var in pdv.vars() {
        if state.is_output_var(&var.name) {
            output.append_column(VarMeta::from(var));
        }
    }
    let mut cells = vec![Cell::MISSING_NUMBER; output.column_count()];
    for (col_idx, meta) in output.columns().iter().enumerate() {
        if let Some(pdv_idx) = pdv.index_of(&meta.name) {
            cells[col_idx] = pdv.value(pdv_idx);
        }
    }
    output.append_row(cells);
}

fn exec_block(stmts: &[Statement], ctx: &mut RowCtx) -> Result<Flow, CoreError> {
    for stmt in stmts {
        match exec_stmt(stmt, ctx)? {
            Flow::Normal => {}
            flow => return Ok(flow),
        }
    }
    Ok(Flow::Normal)
}

fn exec_stmt(stmt: &Statement, ctx: &mut RowCtx) -> Result<Flow, CoreError> {
    match stmt {
        Statement::Assign { target, value } => {
            let result = eval_soft(value, ctx);
            assign_to_target(target, result, ctx)?;
            Ok(Flow::Normal)
        }
        Statement::Output => {
            sync_and_emit(ctx.pdv, ctx.state, ctx.output);
            *ctx.output_happened = true;
            Ok(Flow::Normal)
        }
        Statement::IfThenElse { cond, then_branch, else_branch } => {
            if eval_bool_soft(cond, ctx) {
                exec_block(then_branch, ctx)
            } else if let Some(else_branch) = else_branch {
                exec_block(else_branch, ctx)
            } else {
                Ok(Flow::Normal)
            }
        }
        Statement::DoIndexed { var, start, end, by, body } => {
            let start_v = eval_num_soft(start, ctx);
            let end_v = eval_num_soft(end, ctx);
            let step_v = match by {
                Some(expr) => eval_num_soft(expr, ctx),
                None => 1.0,
            };
            let idx = ctx.pdv.declare(var, false);
            ctx.pdv.set_value(idx, Cell::Number(start_v));
            loop {
                let current = ctx.pdv.value(idx).to_number(ctx.interner);
                if current.is_nan() {
                    break;
                }
                if step_v >= 0.0 {
                    if current > end_v {
                        break;
                    }
                } else if current < end_v {
                    break;
                }
                match exec_block(body, ctx)? {
                    Flow::Leave => break,
                    Flow::ContinueLoop | Flow::Normal => {}
                }
                let next = ctx.pdv.value(idx).to_number(ctx.interner) + step_v;
                ctx.pdv.set_value(idx, Cell::Number(next));
            }
            Ok(Flow::Normal)
        }
        Statement::DoWhile { cond, body } => {
            loop {
                if !eval_bool_soft(cond, ctx) {
                    break;
                }
                match exec_block(body, ctx)? {
                    Flow::Leave => break,
                    Flow::ContinueLoop | Flow::Normal => {}
                }
            }
            Ok(Flow::Normal)
        }
        Statement::DoUntil { cond, body } => {
            loop {
                match exec_block(body, ctx)? {
                    Flow::Leave => break,
                    Flow::ContinueLoop | Flow::Normal => {}
                }
                if eval_bool_soft(cond, ctx) {
                    break;
                }
            }
            Ok(Flow::Normal)
        }
        Statement::Block(body) => exec_block(body, ctx),
        Statement::Leave => Ok(Flow::Leave),
        Statement::Continue => Ok(Flow::ContinueLoop),
        // Declarative statements: their effect was already applied during
        // pre-scan; encountering them mid-execution is a no-op.
        Statement::Set(_)
        | Statement::Merge(_)
        | Statement::By(_)
        | Statement::Input(_)
        | Statement::Datalines(_)
        | Statement::Drop(_)
        | Statement::Keep(_)
        | Statement::Retain(_)
        | Statement::Array(_)
        | Statement::Label(_)
        | Statement::Length(_)
        | Statement::Format(_)
        | Statement::Informat(_)
        | Statement::Null => Ok(Flow::Normal),
    }
}

/// Recursively collects ARRAY/RETAIN/LENGTH/LABEL/FORMAT/INFORMAT/DROP/KEEP
/// effects, wherever in the body they appear.
fn prescan(
    stmts: &[Statement],
    pdv: &mut Pdv,
    arrays: &mut HashMap<String, Vec<String>>,
    drop: &mut HashSet<String>,
    keep: &mut Option<HashSet<String>>,
    interner: &mut StringInterner,
) {
    for stmt in stmts {
        match stmt {
            Statement::Assign { target, value } => {
                // Spec §4.3 pre-scan: a variable first assigned inside a
                // conditionally-skipped branch must still preexist in the
                // PDV before execution begins, so it takes its column
                // position from program order rather than from the first
                // row that happens to take that branch.
                if let AssignTarget::Variable(name) = target {
                    pdv.declare(name, matches!(value, Expr::StringLit(_)));
                }
            }
            Statement::Array(decl) => declare_array(decl, pdv, arrays),
            Statement::Retain(specs) => declare_retain(specs, pdv, arrays, interner),
            Statement::Length(specs) => declare_length(specs, pdv),
            Statement::Label(pairs) => {
                for (name, label) in pairs {
                    let idx = pdv.declare(name, false);
                    pdv.var_mut(idx).label = Some(label.clone());
                }
            }
            Statement::Format(pairs) => {
                for (name, format) in pairs {
                    let idx = pdv.declare(name, false);
                    pdv.var_mut(idx).format = Some(format.clone());
                }
            }
            Statement::Informat(pairs) => {
                for (name, informat) in pairs {
                    let idx = pdv.declare(name, false);
                    pdv.var_mut(idx).informat = Some(informat.clone());
                }
            }
            Statement::Drop(names) => drop.extend(names.iter().map(|n| n.to_ascii_uppercase())),
            Statement::Keep(names) => {
                keep.get_or_insert_with(HashSet::new)
                    .extend(names.iter().map(|n| n.to_ascii_uppercase()));
            }
            Statement::IfThenElse { then_branch, else_branch, .. } => {
                prescan(then_branch, pdv, arrays, drop, keep, interner);
                if let Some(else_branch) = else_branch {
                    prescan(else_branch, pdv, arrays, drop, keep, interner);
                }
            }
            Statement::DoIndexed { body, .. }
            | Statement::DoWhile { body, .. }
            | Statement::DoUntil { body, .. }
            | Statement::Block(body) => prescan(body, pdv, arrays, drop, keep, interner),
            _ => {}
        }
    }
}

fn declare_array(decl: &ArrayDecl, pdv: &mut Pdv, arrays: &mut HashMap<String, Vec<String>>) {
    for name in &decl.vars {
        pdv.declare(name, false);
    }
    arrays.insert(decl.name.to_ascii_uppercase(), decl.vars.iter().map(|v| v.to_ascii_uppercase()).collect());
}

fn declare_retain(
    specs: &[RetainSpec],
    pdv: &mut Pdv,
    arrays: &HashMap<String, Vec<String>>,
    interner: &mut StringInterner,
) {
    for spec in specs {
        let idx = pdv.declare(&spec.name, false);
        pdv.var_mut(idx).retain = true;
        if let Some(initial) = &spec.initial {
            let eval_ctx = PdvEvalContext { pdv, arrays };
            if let Ok(value) = eval(initial, &eval_ctx, interner) {
                let idx = pdv.index_of(&spec.name).expect("just declared");
                pdv.set_value(idx, value);
            }
        }
    }
}

fn declare_length(specs: &[LengthSpec], pdv: &mut Pdv) {
    for spec in specs {
        let idx = pdv.declare(&spec.name, spec.is_char);
        pdv.var_mut(idx).length = spec.length;
    }
}

fn contains_output(stmts: &[Statement]) -> bool {
    stmts.iter().any(|stmt| match stmt {
        Statement::Output => true,
        Statement::IfThenElse { then_branch, else_branch, .. } => {
            contains_output(then_branch) || else_branch.as_deref().is_some_and(contains_output)
        }
        Statement::DoIndexed { body, .. }
        | Statement::DoWhile { body, .. }
        | Statement::DoUntil { body, .. }
        | Statement::Block(body) => contains_output(body),
        _ => false,
    })
}

/// Where a DATA step's rows come from (spec §4.3 "row source selection").
enum RowSource {
    /// No SET/MERGE/DATALINES: the body runs exactly once.
    Single,
    /// `SET ds1 ds2 ...;` — concatenated rows, materialized up front.
    Concat(Vec<(Vec<VarMeta>, Vec<Cell>)>),
    /// `MERGE ds1 ds2 ...; BY ...;` — BY-driven interleave, materialized up
    /// front as one PDV-load step per output row, each step already carrying
    /// its `FIRST.var`/`LAST.var` flags (spec §4.3.1).
    Merge { steps: Vec<MergeStep>, by: Vec<String> },
    /// `DATALINES; ... ;` paired with `INPUT`.
    Datalines { lines: Vec<String>, specs: Vec<sas_ast::InputVarSpec> },
}

impl RowSource {
    fn from_body(body: &[Statement], env: &Environment, pdv: &mut Pdv) -> Result<RowSource, CoreError> {
        let mut set_names = None;
        let mut merge_names = None;
        let mut by = Vec::new();
        let mut datalines = None;
        let mut input_specs = Vec::new();
        for stmt in body {
            match stmt {
                Statement::Set(names) => set_names = Some(names.clone()),
                Statement::Merge(names) => merge_names = Some(names.clone()),
                Statement::By(names) => by = names.clone(),
                Statement::Datalines(lines) => datalines = Some(lines.clone()),
                Statement::Input(specs) => input_specs = specs.clone(),
                _ => {}
            }
        }

        if let Some(lines) = datalines {
            for spec in &input_specs {
                pdv.declare(&spec.name, spec.is_char);
            }
            return Ok(RowSource::Datalines { lines, specs: input_specs });
        }

        if let Some(names) = merge_names {
            let mut datasets = Vec::new();
            for qname in &names {
                let ds = env.lookup_dataset(qname.library.as_deref(), &qname.name)?.clone();
                for col in ds.columns() {
                    pdv.declare(&col.name, col.is_char);
                }
                datasets.push(ds);
            }
            let steps = merge_by(&datasets, &by);
            return Ok(RowSource::Merge { steps, by });
        }

        if let Some(names) = set_names {
            let mut rows = Vec::new();
            for qname in &names {
                let ds = env.lookup_dataset(qname.library.as_deref(), &qname.name)?.clone();
                for col in ds.columns() {
                    pdv.declare(&col.name, col.is_char);
                }
                let columns = ds.columns().to_vec();
                for row in ds.rows() {
                    rows.push((columns.clone(), row.to_vec()));
                }
            }
            return Ok(RowSource::Concat(rows));
        }

        Ok(RowSource::Single)
    }
}

/// One merged-BY-group output row: per-source columns/cells (empty for a
/// source that did not contribute this key), plus per-BY-variable
/// `FIRST.var`/`LAST.var` flags (spec §4.3.1: true on the first/last row
/// within that variable's run of equal values).
struct MergeStep {
    sources: Vec<(Vec<VarMeta>, Vec<Cell>)>,
    first: Vec<bool>,
    last: Vec<bool>,
}

/// Produces one step per output observation: for each source dataset, the
/// columns/row contributed this step if its BY key matched the smallest key
/// among all cursors with rows remaining, `None` otherwise. `FIRST.var`/
/// `LAST.var` for the `j`th BY variable compares the key prefix `by[..=j]`
/// against the neighboring step, matching SAS's rule that a change in an
/// earlier BY variable also starts a new group for every variable after it.
fn merge_by(datasets: &[Dataset], by: &[String]) -> Vec<MergeStep> {
    let mut cursors = vec![0usize; datasets.len()];
    let mut keys: Vec<Vec<Cell>> = Vec::new();
    let mut sources: Vec<Vec<(Vec<VarMeta>, Vec<Cell>)>> = Vec::new();

    loop {
        let mut min_key: Option<Vec<Cell>> = None;
        for (i, ds) in datasets.iter().enumerate() {
            if cursors[i] >= ds.row_count() {
                continue;
            }
            let key = by_key(ds, cursors[i], by);
            min_key = Some(match min_key {
                None => key,
                Some(current) => {
                    if key_less(&key, &current) {
                        key
                    } else {
                        current
                    }
                }
            });
        }
        let Some(min_key) = min_key else { break };

        let mut step = Vec::new();
        for (i, ds) in datasets.iter().enumerate() {
            if cursors[i] < ds.row_count() && by_key(ds, cursors[i], by) == min_key {
                step.push((ds.columns().to_vec(), ds.row(cursors[i]).to_vec()));
                cursors[i] += 1;
            } else {
                step.push((Vec::new(), Vec::new()));
            }
        }
        sources.push(step);
        keys.push(min_key);
    }

    let n = keys.len();
    sources
        .into_iter()
        .enumerate()
        .map(|(i, step_sources)| {
            let first = (0..by.len()).map(|j| i == 0 || keys[i][..=j] != keys[i - 1][..=j]).collect();
            let last = (0..by.len()).map(|j| i + 1 == n || keys[i][..=j] != keys[i + 1][..=j]).collect();
            MergeStep { sources: step_sources, first, last }
        })
        .collect()
}

fn by_key(ds: &Dataset, row: usize, by: &[String]) -> Vec<Cell> {
    by.iter()
        .map(|name| ds.column_index(name).map(|idx| ds.row(row)[idx]).unwrap_or(Cell::MISSING_NUMBER))
        .collect()
}

fn key_less(a: &[Cell], b: &[Cell]) -> bool {
    for (x, y) in a.iter().zip(b.iter()) {
        match (x, y) {
            (Cell::Number(m), Cell::Number(n)) => {
                if m < n {
                    return true;
                }
                if m > n {
                    return false;
                }
            }
            _ => continue,
        }
    }
    false
}

fn bool_number(b: bool) -> Cell {
    Cell::Number(if b { 1.0 } else { 0.0 })
}

fn parse_datalines_number(raw: &str) -> Cell {
    Cell::Number(raw.trim().parse().unwrap_or(f64::NAN))
}

fn run_rows(
    body: &[Statement],
    pdv: &mut Pdv,
    state: &StepState,
    source: RowSource,
    output_seen_anywhere: bool,
    interner: &mut StringInterner,
    output: &mut Dataset,
) -> Result<(), CoreError> {
    match source {
        RowSource::Single => {
            run_one_row(body, pdv, state, output_seen_anywhere, interner, output)?;
        }
        RowSource::Concat(rows) => {
            for (columns, cells) in rows {
                pdv.reset_for_next_row();
                for (meta, cell) in columns.iter().zip(cells.iter()) {
                    let idx = pdv.declare(&meta.name, meta.is_char);
                    pdv.set_value(idx, *cell);
                }
                run_body_and_emit(body, pdv, state, output_seen_anywhere, interner, output)?;
            }
        }
        RowSource::Merge { steps, by } => {
            for step in steps {
                pdv.reset_for_next_row();
                for (columns, cells) in &step.sources {
                    for (meta, cell) in columns.iter().zip(cells.iter()) {
                        let idx = pdv.declare(&meta.name, meta.is_char);
                        pdv.set_value(idx, *cell);
                    }
                }
                for (j, var) in by.iter().enumerate() {
                    let upper = var.to_ascii_uppercase();
                    let first_idx = pdv.declare(&format!("FIRST.{upper}"), false);
                    pdv.set_value(first_idx, bool_number(step.first[j]));
                    let last_idx = pdv.declare(&format!("LAST.{upper}"), false);
                    pdv.set_value(last_idx, bool_number(step.last[j]));
                }
                run_body_and_emit(body, pdv, state, output_seen_anywhere, interner, output)?;
            }
        }
        RowSource::Datalines { lines, specs } => {
            for line in &lines {
                pdv.reset_for_next_row();
                let fields: Vec<&str> = line.split_whitespace().collect();
                for (i, spec) in specs.iter().enumerate() {
                    let raw = fields.get(i).copied().unwrap_or("");
                    let idx = pdv.declare(&spec.name, spec.is_char);
                    let value = if spec.is_char {
                        Cell::from_str(interner, raw)
                    } else {
                        parse_datalines_number(raw)
                    };
                    pdv.set_value(idx, value);
                }
                run_body_and_emit(body, pdv, state, output_seen_anywhere, interner, output)?;
            }
        }
    }
    Ok(())
}

fn run_one_row(
    body: &[Statement],
    pdv: &mut Pdv,
    state: &StepState,
    output_seen_anywhere: bool,
    interner: &mut StringInterner,
    output: &mut Dataset,
) -> Result<(), CoreError> {
    pdv.reset_for_next_row();
    run_body_and_emit(body, pdv, state, output_seen_anywhere, interner, output)
}

fn run_body_and_emit(
    body: &[Statement],
    pdv: &mut Pdv,
    state: &StepState,
    output_seen_anywhere: bool,
    interner: &mut StringInterner,
    output: &mut Dataset,
) -> Result<(), CoreError> {
    let mut output_happened = false;
    let flow = {
        let mut ctx = RowCtx { pdv, state, interner, output, output_happened: &mut output_happened };
        exec_block(body, &mut ctx)?
    };
    if matches!(flow, Flow::Leave | Flow::ContinueLoop) {
        return Err(CoreError::NotInLoop);
    }
    if !output_happened && !output_seen_anywhere {
        sync_and_emit(pdv, state, output);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use sas_ast::TopLevelStatement;
    use sas_parser::{ParseOutcome, Parser};

    use super::*;

    fn run_source(source: &str, env: &mut Environment) {
        let mut parser = Parser::new_with_source(source).expect("should lex");
        loop {
            match parser.parse_next_statement() {
                ParseOutcome::Complete(TopLevelStatement::Data(step)) => {
                    run_data_step(&step, env).expect("DATA step should run");
                }
                ParseOutcome::Complete(_) => {}
                ParseOutcome::Eof => break,
                other => panic!("unexpected parse outcome: {other:?}"),
            }
        }
    }

    #[test]
    fn merge_by_sets_first_and_last_markers_per_by_group() {
        let mut env = Environment::new();
        run_source(
            "data a; input id v1 $; datalines;\n1 x\n1 y\n2 z\n;\nrun;\n\
             data b; input id v2; datalines;\n1 10\n2 20\n3 30\n;\nrun;\n\
             data m; merge a b; by id; fflag = first.id; lflag = last.id; run;",
            &mut env,
        );
        let m = env.lookup_dataset(None, "m").unwrap();
        let id_col = m.column_index("ID").unwrap();
        let first_col = m.column_index("FFLAG").unwrap();
        let last_col = m.column_index("LFLAG").unwrap();
        let flags: Vec<(f64, f64, f64)> = m
            .rows()
            .map(|row| {
                (
                    row[id_col].to_number(&env.interner),
                    row[first_col].to_number(&env.interner),
                    row[last_col].to_number(&env.interner),
                )
            })
            .collect();
        assert_eq!(flags, vec![(1.0, 1.0, 0.0), (1.0, 0.0, 1.0), (2.0, 1.0, 1.0), (3.0, 1.0, 1.0)]);
        // FIRST./LAST. are automatic, never columns of the output dataset.
        assert!(m.column_index("FIRST.ID").is_none());
        assert!(m.column_index("LAST.ID").is_none());
    }

    #[test]
    fn assign_inside_skipped_branch_still_predeclares_the_column() {
        // Row 0 never takes the branch that assigns Y; row 1 does. Without
        // pre-scanning Assign targets, Y would only appear in the output
        // once row 1 runs, shifting its column position out of program
        // order (spec §4.3 pre-scan bullet 3).
        let mut env = Environment::new();
        run_source(
            "data a; input flag; datalines;\n0\n1\n;\nrun;\n\
             data b; set a; if flag = 1 then y = 1; run;",
            &mut env,
        );
        let b = env.lookup_dataset(None, "b").unwrap();
        assert_eq!(b.columns()[1].name, "Y");
        assert!(b.row(0)[1].is_missing());
        assert_eq!(b.row(1)[1].to_number(&env.interner), 1.0);
    }
}
