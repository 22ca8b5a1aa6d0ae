//! Single-pass scope-stack AST visitor (spec.md §4.2).
//!
//! One recursive descent per file, dispatched per language via a `match` on
//! `node.kind()` rather than tree-sitter queries — the scope stack and the
//! `parentSymbolKey` threaded down the recursion are easier to reason about
//! as explicit traversal state than as query captures. Grounded on this
//! codebase's general "match on node.kind, recurse into children" visitor
//! shape (`parsing/rust.rs`'s `extract_imports_from_node`/`extract_use_tree`),
//! adapted to emit symbols, scoped calls, and imports in one walk instead of
//! imports alone.

use std::collections::HashMap;

use graph_core::types::{
    CallInfo, ImportInfo, Language, Range, ScopeEntry, ScopeKind, Symbol, SymbolKind,
};
use tree_sitter::{Node, Tree};

/// Everything the batch pipeline needs out of one file's traversal.
/// `symbols` is in emission order, which callers rely on to correlate
/// inserted row ids back to each symbol's own key (spec.md §4.2's output
/// contract; see `graph_engine::IndexEngine`'s global-map population).
pub struct ExtractionOutput {
    pub symbols: Vec<Symbol>,
    pub imports: Vec<ImportInfo>,
    pub calls: Vec<CallInfo>,
}

pub fn extract(tree: &Tree, source: &[u8], file_path: &str, language: Language) -> ExtractionOutput {
    let mut ex = Extractor {
        source,
        file_path: file_path.to_string(),
        symbols: Vec::new(),
        imports: Vec::new(),
        calls: Vec::new(),
        import_map: HashMap::new(),
        scope_stack: vec![ScopeEntry { name: "module".to_string(), kind: ScopeKind::Module, line: 1 }],
    };
    let root = tree.root_node();
    match language {
        Language::Typescript | Language::Tsx => {
            for child in root.children(&mut root.walk()) {
                ex.walk_ts(child, None);
            }
        }
        Language::Python => {
            for child in root.children(&mut root.walk()) {
                ex.walk_python(child, None);
            }
        }
        Language::C => {
            for child in root.children(&mut root.walk()) {
                ex.walk_c(child, None);
            }
        }
    }
    ExtractionOutput { symbols: ex.symbols, imports: ex.imports, calls: ex.calls }
}

struct Extractor<'a> {
    source: &'a [u8],
    file_path: String,
    symbols: Vec<Symbol>,
    imports: Vec<ImportInfo>,
    calls: Vec<CallInfo>,
    /// Per-file import map keyed by local name, consulted by call recording
    /// to populate `is_imported`/`import_source_module` (spec.md §4.2).
    import_map: HashMap<String, ImportInfo>,
    scope_stack: Vec<ScopeEntry>,
}

impl<'a> Extractor<'a> {
    fn text(&self, node: Node) -> String {
        node_text(node, self.source)
    }

    fn current_scope_context(&self) -> String {
        self.scope_stack
            .iter()
            .filter(|e| matches!(e.kind, ScopeKind::Class | ScopeKind::Function))
            .map(|e| e.name.as_str())
            .collect::<Vec<_>>()
            .join(" > ")
    }

    fn push_symbol(&mut self, name: &str, kind: SymbolKind, node: Node) -> String {
        let start_line = node.start_position().row as u32 + 1;
        let end_line = node.end_position().row as u32 + 1;
        let range = Range {
            start_line,
            start_column: node.start_position().column as u32,
            end_line,
            end_column: node.end_position().column as u32,
        };
        let complexity = match kind {
            SymbolKind::Function | SymbolKind::Method => count_complexity(node, self.source),
            _ => 1,
        };
        let symbol = Symbol { id: 0, name: name.to_string(), kind, file_path: self.file_path.clone(), range, complexity };
        let key = symbol.own_key();
        self.symbols.push(symbol);
        key
    }

    fn record_import(&mut self, imported_name: &str, local_name: &str, source_module: &str, line: u32) {
        let info = ImportInfo {
            imported_name: imported_name.to_string(),
            local_name: local_name.to_string(),
            source_module: source_module.to_string(),
            file_path: self.file_path.clone(),
            line,
        };
        self.import_map.insert(local_name.to_string(), info.clone());
        self.imports.push(info);
    }

    fn record_call(&mut self, call_node: Node, func_field: Node, parent_key: Option<String>) {
        let Some(caller_key) = parent_key else { return };
        let Some(callee_name) = callee_name(func_field, self.source) else { return };
        let line = call_node.start_position().row as u32 + 1;
        let scope_context = self.current_scope_context();
        let (is_imported, import_source_module, imported_original_name) = match self.import_map.get(&callee_name) {
            Some(info) => (true, Some(info.source_module.clone()), Some(info.imported_name.clone())),
            None => (false, None, None),
        };
        self.calls.push(CallInfo {
            caller_symbol_key: caller_key,
            callee_name,
            file_path: self.file_path.clone(),
            line,
            scope_context,
            is_imported,
            import_source_module,
            imported_original_name,
        });
    }

    // -- TypeScript / TSX -----------------------------------------------

    fn walk_ts(&mut self, node: Node, parent_key: Option<String>) {
        match node.kind() {
            "import_statement" => {
                self.extract_ts_import(node);
            }
            "function_declaration" => {
                self.emit_block_and_recurse_ts(node, SymbolKind::Function, parent_key);
                return;
            }
            "method_definition" => {
                self.emit_block_and_recurse_ts(node, SymbolKind::Method, parent_key);
                return;
            }
            "class_declaration" => {
                self.emit_block_and_recurse_ts(node, SymbolKind::Class, parent_key);
                return;
            }
            "interface_declaration" => {
                self.emit_block_and_recurse_ts(node, SymbolKind::Interface, parent_key);
                return;
            }
            "type_alias_declaration" => {
                self.emit_block_and_recurse_ts(node, SymbolKind::Type, parent_key);
                return;
            }
            "enum_declaration" => {
                self.emit_block_and_recurse_ts(node, SymbolKind::Enum, parent_key);
                return;
            }
            "lexical_declaration" | "variable_declaration" => {
                self.handle_ts_variable_declaration(node, parent_key);
                return;
            }
            "call_expression" => {
                if let Some(func) = node.child_by_field_name("function") {
                    self.record_call(node, func, parent_key.clone());
                }
            }
            "arrow_function" | "function_expression" => {
                // An inline callback (e.g. the arrow passed to `.reduce(...)`)
                // still gets its own symbol for complexity/trace purposes,
                // but calls inside it attribute to the nearest *named*
                // enclosing symbol, not to this anonymous one — `parent_key`
                // is deliberately left unchanged for the recursion rather
                // than rebound to the anonymous symbol's own key (spec.md
                // §4.2/§8 Scenario A: `sum`'s reduce callback calling `add`
                // is recorded as `sum -> add`, not `<anonymous> -> add`).
                let line = node.start_position().row as u32 + 1;
                let name = format!("<anonymous:{line}>");
                self.push_symbol(&name, SymbolKind::Function, node);
                self.scope_stack.push(ScopeEntry { name, kind: ScopeKind::Function, line });
                for child in node.children(&mut node.walk()) {
                    self.walk_ts(child, parent_key.clone());
                }
                self.scope_stack.pop();
                return;
            }
            _ => {}
        }
        for child in node.children(&mut node.walk()) {
            self.walk_ts(child, parent_key.clone());
        }
    }

    fn emit_block_and_recurse_ts(&mut self, node: Node, kind: SymbolKind, parent_key: Option<String>) {
        let _ = parent_key;
        let line = node.start_position().row as u32 + 1;
        let name = first_identifier_name(node, self.source).unwrap_or_else(|| format!("<anonymous:{line}>"));
        let key = self.push_symbol(&name, kind, node);
        self.scope_stack.push(ScopeEntry { name, kind: scope_kind_for(kind), line });
        for child in node.children(&mut node.walk()) {
            self.walk_ts(child, Some(key.clone()));
        }
        self.scope_stack.pop();
    }

    fn handle_ts_variable_declaration(&mut self, node: Node, parent_key: Option<String>) {
        for child in node.children(&mut node.walk()) {
            if child.kind() != "variable_declarator" {
                continue;
            }
            let line = child.start_position().row as u32 + 1;
            let name = child
                .child_by_field_name("name")
                .map(|n| self.text(n))
                .unwrap_or_else(|| format!("<anonymous:{line}>"));
            let value = child.child_by_field_name("value");
            let is_fn_init = value.map(|v| matches!(v.kind(), "arrow_function" | "function_expression")).unwrap_or(false);

            if is_fn_init {
                let value_node = value.expect("checked above");
                let fn_line = value_node.start_position().row as u32 + 1;
                let key = self.push_symbol(&name, SymbolKind::Function, value_node);
                self.scope_stack.push(ScopeEntry { name: name.clone(), kind: ScopeKind::Function, line: fn_line });
                for gc in value_node.children(&mut value_node.walk()) {
                    self.walk_ts(gc, Some(key.clone()));
                }
                self.scope_stack.pop();
            } else {
                let key = self.push_symbol(&name, SymbolKind::Variable, child);
                self.scope_stack.push(ScopeEntry { name: name.clone(), kind: ScopeKind::Block, line });
                if let Some(v) = value {
                    self.walk_ts(v, Some(key.clone()));
                }
                self.scope_stack.pop();
            }
        }
    }

    fn extract_ts_import(&mut self, node: Node) {
        let line = node.start_position().row as u32 + 1;
        let module = node
            .children(&mut node.walk())
            .find(|c| c.kind() == "string")
            .map(|n| strip_quotes(&self.text(n)));
        let Some(module) = module else { return };
        let Some(clause) = node.children(&mut node.walk()).find(|c| c.kind() == "import_clause") else { return };

        for child in clause.children(&mut clause.walk()) {
            match child.kind() {
                "identifier" => {
                    let local = self.text(child);
                    self.record_import("default", &local, &module, line);
                }
                "namespace_import" => {
                    if let Some(ident) = child.children(&mut child.walk()).find(|c| c.kind() == "identifier") {
                        let local = self.text(ident);
                        self.record_import("*", &local, &module, line);
                    }
                }
                "named_imports" => {
                    for spec in child.children(&mut child.walk()) {
                        if spec.kind() != "import_specifier" {
                            continue;
                        }
                        let Some(name_node) = spec.child_by_field_name("name") else { continue };
                        let imported = self.text(name_node);
                        let local = spec.child_by_field_name("alias").map(|a| self.text(a)).unwrap_or_else(|| imported.clone());
                        self.record_import(&imported, &local, &module, line);
                    }
                }
                _ => {}
            }
        }
    }

    // -- Python -----------------------------------------------------------

    fn walk_python(&mut self, node: Node, parent_key: Option<String>) {
        match node.kind() {
            "import_statement" => self.extract_python_import(node),
            "import_from_statement" => self.extract_python_import_from(node),
            "function_definition" => {
                self.emit_python_and_recurse(node, SymbolKind::Function, parent_key);
                return;
            }
            "class_definition" => {
                self.emit_python_and_recurse(node, SymbolKind::Class, parent_key);
                return;
            }
            "call" => {
                if let Some(func) = node.child_by_field_name("function") {
                    self.record_call(node, func, parent_key.clone());
                }
            }
            _ => {}
        }
        for child in node.children(&mut node.walk()) {
            self.walk_python(child, parent_key.clone());
        }
    }

    fn emit_python_and_recurse(&mut self, node: Node, kind: SymbolKind, parent_key: Option<String>) {
        let _ = parent_key;
        let line = node.start_position().row as u32 + 1;
        let name = first_identifier_name(node, self.source).unwrap_or_else(|| format!("<anonymous:{line}>"));
        let key = self.push_symbol(&name, kind, node);
        self.scope_stack.push(ScopeEntry { name, kind: scope_kind_for(kind), line });
        for child in node.children(&mut node.walk()) {
            self.walk_python(child, Some(key.clone()));
        }
        self.scope_stack.pop();
    }

    fn extract_python_import(&mut self, node: Node) {
        let line = node.start_position().row as u32 + 1;
        for child in node.children(&mut node.walk()) {
            match child.kind() {
                "dotted_name" => {
                    let dotted = self.text(child);
                    self.record_import(&dotted, &dotted, &dotted, line);
                }
                "aliased_import" => {
                    let Some(name_node) = child.child_by_field_name("name") else { continue };
                    let dotted = self.text(name_node);
                    let local = child.child_by_field_name("alias").map(|a| self.text(a)).unwrap_or_else(|| dotted.clone());
                    self.record_import(&dotted, &local, &dotted, line);
                }
                _ => {}
            }
        }
    }

    fn extract_python_import_from(&mut self, node: Node) {
        let line = node.start_position().row as u32 + 1;
        let Some(module_node) = node.child_by_field_name("module_name") else { return };
        let module = self.text(module_node);
        for child in node.children(&mut node.walk()) {
            if child == module_node {
                continue;
            }
            match child.kind() {
                "dotted_name" | "identifier" => {
                    let name = self.text(child);
                    self.record_import(&name, &name, &module, line);
                }
                "aliased_import" => {
                    let Some(name_node) = child.child_by_field_name("name") else { continue };
                    let imported = self.text(name_node);
                    let local = child.child_by_field_name("alias").map(|a| self.text(a)).unwrap_or_else(|| imported.clone());
                    self.record_import(&imported, &local, &module, line);
                }
                _ => {}
            }
        }
    }

    // -- C ------------------------------------------------------------------

    fn walk_c(&mut self, node: Node, parent_key: Option<String>) {
        match node.kind() {
            "function_definition" => {
                self.emit_c_function_and_recurse(node, parent_key);
                return;
            }
            "struct_specifier" => {
                if self.maybe_emit_c_type(node, SymbolKind::Struct, parent_key.clone()) {
                    return;
                }
            }
            "enum_specifier" => {
                if self.maybe_emit_c_type(node, SymbolKind::Enum, parent_key.clone()) {
                    return;
                }
            }
            "union_specifier" => {
                if self.maybe_emit_c_type(node, SymbolKind::Union, parent_key.clone()) {
                    return;
                }
            }
            "call_expression" => {
                if let Some(func) = node.child_by_field_name("function") {
                    self.record_call(node, func, parent_key.clone());
                }
            }
            _ => {}
        }
        for child in node.children(&mut node.walk()) {
            self.walk_c(child, parent_key.clone());
        }
    }

    fn emit_c_function_and_recurse(&mut self, node: Node, parent_key: Option<String>) {
        let _ = parent_key;
        let line = node.start_position().row as u32 + 1;
        let name = node
            .child_by_field_name("declarator")
            .and_then(|d| find_identifier_recursive(d, self.source))
            .unwrap_or_else(|| format!("<anonymous:{line}>"));
        let key = self.push_symbol(&name, SymbolKind::Function, node);
        self.scope_stack.push(ScopeEntry { name, kind: ScopeKind::Function, line });
        for child in node.children(&mut node.walk()) {
            self.walk_c(child, Some(key.clone()));
        }
        self.scope_stack.pop();
    }

    /// Returns `true` if this occurrence is a definition (has a `body`) and
    /// was emitted + recursed; `false` for a bare forward reference, which
    /// the caller falls through to the generic child recursion for.
    fn maybe_emit_c_type(&mut self, node: Node, kind: SymbolKind, parent_key: Option<String>) -> bool {
        let _ = parent_key;
        if node.child_by_field_name("body").is_none() {
            return false;
        }
        let line = node.start_position().row as u32 + 1;
        let name = node.child_by_field_name("name").map(|n| self.text(n)).unwrap_or_else(|| format!("<anonymous:{line}>"));
        let key = self.push_symbol(&name, kind, node);
        self.scope_stack.push(ScopeEntry { name, kind: scope_kind_for(kind), line });
        for child in node.children(&mut node.walk()) {
            self.walk_c(child, Some(key.clone()));
        }
        self.scope_stack.pop();
        true
    }
}

fn scope_kind_for(kind: SymbolKind) -> ScopeKind {
    match kind {
        SymbolKind::Function | SymbolKind::Method => ScopeKind::Function,
        SymbolKind::Class | SymbolKind::Interface | SymbolKind::Enum | SymbolKind::Struct | SymbolKind::Union => ScopeKind::Class,
        SymbolKind::Type | SymbolKind::Variable | SymbolKind::Decorator => ScopeKind::Block,
    }
}

fn node_text(node: Node, source: &[u8]) -> String {
    node.utf8_text(source).unwrap_or("").to_string()
}

fn strip_quotes(s: &str) -> String {
    s.trim_matches(|c| c == '"' || c == '\'').to_string()
}

fn first_identifier_name(node: Node, source: &[u8]) -> Option<String> {
    if let Some(n) = node.child_by_field_name("name") {
        return Some(node_text(n, source));
    }
    node.children(&mut node.walk())
        .find(|c| matches!(c.kind(), "identifier" | "type_identifier" | "property_identifier"))
        .map(|n| node_text(n, source))
}

fn find_identifier_recursive(node: Node, source: &[u8]) -> Option<String> {
    if node.kind() == "identifier" {
        return Some(node_text(node, source));
    }
    node.children(&mut node.walk()).find_map(|c| find_identifier_recursive(c, source))
}

/// Derives a callee name from a call expression's `function` field: a
/// direct identifier, or the trailing property of a member/attribute access
/// (spec.md §4.2).
fn callee_name(node: Node, source: &[u8]) -> Option<String> {
    match node.kind() {
        "identifier" | "field_identifier" | "type_identifier" => Some(node_text(node, source)),
        "member_expression" => node.child_by_field_name("property").map(|p| node_text(p, source)),
        "attribute" => node.child_by_field_name("attribute").map(|p| node_text(p, source)),
        _ => None,
    }
}

/// Cyclomatic complexity over a symbol's entire subtree (spec.md §4.2):
/// starts at 1, +1 per branching construct, +1 per short-circuit boolean
/// operator. Nested function bodies are not excluded — the rule is stated
/// over "the symbol's subtree" with no carve-out.
fn count_complexity(node: Node, source: &[u8]) -> u32 {
    fn visit(n: Node, source: &[u8], count: &mut u32) {
        match n.kind() {
            "if_statement" | "while_statement" | "for_statement" | "for_in_statement" | "case" | "switch_case"
            | "catch_clause" | "ternary_expression" | "conditional_expression" => {
                *count += 1;
            }
            "binary_expression" => {
                if let Some(op) = n.child_by_field_name("operator") {
                    let op_text = op.utf8_text(source).unwrap_or("");
                    if op_text == "&&" || op_text == "||" {
                        *count += 1;
                    }
                }
            }
            _ => {}
        }
        for child in n.children(&mut n.walk()) {
            visit(child, source, count);
        }
    }
    let mut count = 1;
    visit(node, source, &mut count);
    count
}

#[cfg(test)]
#[path = "extractor_tests.rs"]
mod tests;
