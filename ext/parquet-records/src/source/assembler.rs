use log::debug;

use super::{ColumnChunk, ColumnValues, Primitive, Pulled, RecordPuller, RowGroupPages};
use crate::converter::Converter;
use crate::error::{ParquetError, RecordError, Result};
use crate::materializer::RecordMaterializer;
use crate::schema::{Repetition, Schema, SchemaNode};

/// Levels and leaf range of one schema node
#[derive(Debug)]
struct FieldPlan {
    def_level: i16,
    rep_level: i16,
    repeated: bool,
    /// Leaf columns under this node are `first_leaf..leaf_end`
    first_leaf: usize,
    leaf_end: usize,
    children: Vec<FieldPlan>,
}

impl FieldPlan {
    fn build(node: &SchemaNode, def_level: i16, rep_level: i16, next_leaf: &mut usize) -> Self {
        let first_leaf = *next_leaf;
        let children = match node {
            SchemaNode::Primitive { .. } => {
                *next_leaf += 1;
                Vec::new()
            }
            SchemaNode::Group { fields, .. } => fields
                .iter()
                .map(|field| {
                    let (def, rep) = match field.repetition() {
                        Repetition::Required => (def_level, rep_level),
                        Repetition::Optional => (def_level + 1, rep_level),
                        Repetition::Repeated => (def_level + 1, rep_level + 1),
                    };
                    FieldPlan::build(field, def, rep, next_leaf)
                })
                .collect(),
        };
        Self {
            def_level,
            rep_level,
            repeated: node.is_repeated(),
            first_leaf,
            leaf_end: *next_leaf,
            children,
        }
    }

    fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Child index path from the root to every leaf, in leaf order
    fn leaf_paths(&self, prefix: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
        if self.is_leaf() {
            out.push(prefix.clone());
            return;
        }
        for (index, child) in self.children.iter().enumerate() {
            prefix.push(index);
            child.leaf_paths(prefix, out);
            prefix.pop();
        }
    }
}

/// Read position inside one column chunk
#[derive(Debug)]
struct ColumnCursor {
    chunk: ColumnChunk,
    max_def: i16,
    num_levels: usize,
    level: usize,
    value: usize,
    /// The leaf converter took the dictionary and wants ids
    dictionary_ids: bool,
}

impl ColumnCursor {
    fn new(index: usize, chunk: ColumnChunk, max_def: i16) -> Result<Self> {
        let values = chunk.values.len();
        let num_levels = match (chunk.def_levels.len(), chunk.rep_levels.len()) {
            (0, 0) => values,
            (0, reps) => reps,
            (defs, 0) => defs,
            (defs, reps) if defs == reps => defs,
            (defs, reps) => {
                return Err(ParquetError::decoder_inconsistency(format!(
                    "column {} has {} definition levels but {} repetition levels",
                    index, defs, reps
                )))
            }
        };

        let defined = if chunk.def_levels.is_empty() {
            num_levels
        } else {
            chunk.def_levels.iter().filter(|&&d| d == max_def).count()
        };
        if defined != values {
            return Err(ParquetError::decoder_inconsistency(format!(
                "column {} has {} values for {} defined entries",
                index, values, defined
            )));
        }

        Ok(Self {
            chunk,
            max_def,
            num_levels,
            level: 0,
            value: 0,
            dictionary_ids: false,
        })
    }

    fn has_next(&self) -> bool {
        self.level < self.num_levels
    }

    fn current_def_level(&self) -> i16 {
        self.chunk
            .def_levels
            .get(self.level)
            .copied()
            .unwrap_or(self.max_def)
    }

    fn current_rep_level(&self) -> i16 {
        self.chunk.rep_levels.get(self.level).copied().unwrap_or(0)
    }
}

/// What the leaf converter receives for one defined entry
enum LeafEvent<'a> {
    Value(&'a Primitive),
    DictionaryId(u32),
}

#[derive(Debug)]
struct Columns {
    cursors: Vec<ColumnCursor>,
    corrupt: Option<RecordError>,
}

impl Columns {
    fn cursor(&self, leaf: usize) -> Result<&ColumnCursor> {
        self.cursors.get(leaf).filter(|c| c.has_next()).ok_or_else(|| {
            ParquetError::decoder_inconsistency(format!("column {} ran out of values mid-record", leaf))
        })
    }

    fn advance_columns(&mut self, plan: &FieldPlan) {
        for cursor in &mut self.cursors[plan.first_leaf..plan.leaf_end] {
            cursor.level += 1;
        }
    }

    /// Remember the first recoverable failure; fatal ones abort the read
    fn check(&mut self, result: std::result::Result<(), RecordError>) -> Result<()> {
        match result {
            Ok(()) => Ok(()),
            Err(e) if e.is_recoverable() => {
                self.corrupt.get_or_insert(e);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn read_field(&mut self, plan: &FieldPlan, converter: &mut Converter) -> Result<()> {
        if self.cursor(plan.first_leaf)?.current_def_level() < plan.def_level {
            // Absent, or a repeated field with no occurrences
            for leaf in plan.first_leaf..plan.leaf_end {
                self.cursor(leaf)?;
            }
            self.advance_columns(plan);
            return Ok(());
        }

        self.read_present(plan, converter)?;
        if plan.repeated {
            while self
                .cursors
                .get(plan.first_leaf)
                .is_some_and(|c| c.has_next() && c.current_rep_level() == plan.rep_level)
            {
                self.read_present(plan, converter)?;
            }
        }
        Ok(())
    }

    fn read_present(&mut self, plan: &FieldPlan, converter: &mut Converter) -> Result<()> {
        if plan.is_leaf() {
            return self.read_leaf(plan.first_leaf, converter);
        }

        converter.start()?;
        for (index, child) in plan.children.iter().enumerate() {
            self.read_field(child, converter.child_mut(index)?)?;
        }
        converter.end()?;
        Ok(())
    }

    fn read_leaf(&mut self, leaf: usize, converter: &mut Converter) -> Result<()> {
        let converter = converter.as_primitive_mut()?;
        let cursor = self.cursor(leaf)?;
        if cursor.current_def_level() != cursor.max_def {
            return Err(ParquetError::decoder_inconsistency(format!(
                "column {} has definition level {} for a present value (max {})",
                leaf,
                cursor.current_def_level(),
                cursor.max_def
            )));
        }

        let event = match &cursor.chunk.values {
            ColumnValues::Plain(values) => values.get(cursor.value).map(LeafEvent::Value),
            ColumnValues::Dictionary { dictionary, ids } => match ids.get(cursor.value) {
                Some(&id) if cursor.dictionary_ids => Some(LeafEvent::DictionaryId(id)),
                Some(&id) => Some(LeafEvent::Value(dictionary.get(id as usize).ok_or(
                    RecordError::DictionaryId {
                        id,
                        size: dictionary.len(),
                    },
                )?)),
                None => None,
            },
        }
        .ok_or_else(|| {
            ParquetError::decoder_inconsistency(format!("column {} ran out of values", leaf))
        })?;

        let result = match event {
            LeafEvent::Value(value) => converter.add(value),
            LeafEvent::DictionaryId(id) => converter.add_value_from_dictionary(id),
        };

        let cursor = &mut self.cursors[leaf];
        cursor.level += 1;
        cursor.value += 1;
        self.check(result)
    }
}

/// Replays the levels of one row group as converter events, one record per `pull`
#[derive(Debug)]
pub struct ColumnAssembler {
    plan: FieldPlan,
    columns: Columns,
    row_count: u64,
    records_read: u64,
}

impl ColumnAssembler {
    /// Plan the requested schema and hand dictionaries to the leaves that accept them
    pub fn new(
        pages: RowGroupPages,
        requested_schema: &Schema,
        materializer: &mut RecordMaterializer,
    ) -> Result<Self> {
        if pages.columns.len() != requested_schema.leaf_count() {
            return Err(ParquetError::decoder_inconsistency(format!(
                "row group has {} columns but the schema has {} leaves",
                pages.columns.len(),
                requested_schema.leaf_count()
            )));
        }

        let mut next_leaf = 0;
        let plan = FieldPlan::build(&requested_schema.root, 0, 0, &mut next_leaf);
        let mut leaf_paths = Vec::with_capacity(next_leaf);
        plan.leaf_paths(&mut Vec::new(), &mut leaf_paths);
        let max_defs = leaf_def_levels(&plan);

        let mut cursors = Vec::with_capacity(pages.columns.len());
        for (index, chunk) in pages.columns.into_iter().enumerate() {
            let mut cursor = ColumnCursor::new(index, chunk, max_defs[index])?;

            if let ColumnValues::Dictionary { dictionary, .. } = &cursor.chunk.values {
                let mut converter = materializer.root_mut();
                for &child in &leaf_paths[index] {
                    converter = converter.child_mut(child)?;
                }
                let leaf = converter.as_primitive_mut()?;
                if leaf.has_dictionary_support() {
                    leaf.set_dictionary(dictionary)?;
                    cursor.dictionary_ids = true;
                }
            }
            cursors.push(cursor);
        }

        debug!(
            "Assembling {} rows from {} columns",
            pages.row_count,
            cursors.len()
        );

        Ok(Self {
            plan,
            columns: Columns {
                cursors,
                corrupt: None,
            },
            row_count: pages.row_count,
            records_read: 0,
        })
    }

    fn check_fully_consumed(&self) -> Result<()> {
        match self.columns.cursors.iter().position(ColumnCursor::has_next) {
            Some(index) => Err(ParquetError::decoder_inconsistency(format!(
                "column {} has values left after {} rows",
                index, self.row_count
            ))),
            None => Ok(()),
        }
    }
}

fn leaf_def_levels(plan: &FieldPlan) -> Vec<i16> {
    if plan.is_leaf() {
        return vec![plan.def_level];
    }
    plan.children.iter().flat_map(leaf_def_levels).collect()
}

impl RecordPuller for ColumnAssembler {
    fn pull(&mut self, materializer: &mut RecordMaterializer) -> Result<Pulled> {
        if self.records_read >= self.row_count {
            self.check_fully_consumed()?;
            return Ok(Pulled::EndOfRowGroup);
        }

        if let Some(first) = self.columns.cursors.first() {
            if first.has_next() && first.current_rep_level() != 0 {
                return Err(ParquetError::decoder_inconsistency(format!(
                    "record {} does not start at repetition level 0",
                    self.records_read
                )));
            }
        }

        self.columns.corrupt = None;
        let root = materializer.root_mut();
        root.start()?;
        for (index, child) in self.plan.children.iter().enumerate() {
            self.columns.read_field(child, root.child_mut(index)?)?;
        }
        root.end()?;
        self.records_read += 1;

        let record = materializer.current_record();
        Ok(match self.columns.corrupt.take() {
            Some(error) => Pulled::Corrupt(error),
            None => Pulled::Record(record),
        })
    }

    fn finish_row_group(&self) -> Result<()> {
        self.check_fully_consumed()
    }
}
