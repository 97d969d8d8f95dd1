use std::collections::HashMap;

/// Interned symbol id. Stored as the payload of constant cells.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct SymbolId(pub u32);

/// Interned symbol table. Each unique constant name maps to a unique SymbolId,
/// stable for the lifetime of one loaded program.
#[derive(Default)]
pub struct SymbolTable {
    name_to_id: HashMap<String, SymbolId>,
    id_to_name: Vec<String>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            name_to_id: HashMap::new(),
            id_to_name: Vec::new(),
        }
    }

    /// Intern a symbol name. Returns the existing ID if already interned,
    /// or creates a new one.
    pub fn intern(&mut self, name: &str) -> SymbolId {
        if let Some(&id) = self.name_to_id.get(name) {
            return id;
        }
        let id = SymbolId(self.id_to_name.len() as u32);
        self.name_to_id.insert(name.to_string(), id);
        self.id_to_name.push(name.to_string());
        id
    }

    /// Look up a symbol name by its ID. `None` for ids this table never issued.
    pub fn resolve(&self, id: SymbolId) -> Option<&str> {
        self.id_to_name.get(id.0 as usize).map(String::as_str)
    }

    /// Look up a symbol ID by name, without interning.
    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.name_to_id.get(name).copied()
    }

    /// Total number of interned symbols.
    pub fn count(&self) -> usize {
        self.id_to_name.len()
    }

    /// Names in id order.
    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &str)> {
        self.id_to_name
            .iter()
            .enumerate()
            .map(|(i, name)| (SymbolId(i as u32), name.as_str()))
    }
}
