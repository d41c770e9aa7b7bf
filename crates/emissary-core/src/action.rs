use crate::schema::Schema;

/// The contract of one callable module operation: what it accepts and what
/// it must produce. Immutable once constructed; two actions of the same
/// module are distinguished only by name, held in the owning module's table.
#[derive(Debug, Clone)]
pub struct Action {
    input: Schema,
    output: Schema,
}

impl Action {
    pub fn new(input: Schema, output: Schema) -> Self {
        Action { input, output }
    }

    pub fn input(&self) -> &Schema {
        &self.input
    }

    pub fn output(&self) -> &Schema {
        &self.output
    }
}
