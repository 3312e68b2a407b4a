// Label encodings: int, binary and one-hot categorical
//
// Samples carry a raw class index; the encoder turns it into the value (or
// batch array) that the configured `LabelMode` asks for.

use crate::config::LabelMode;

/// Encoded label of a single sample.
#[derive(Debug, Clone, PartialEq)]
pub enum Label {
    Int(i32),
    Binary(f32),
    Categorical(Vec<f32>),
}

impl Label {
    /// Shape of the label value: `[]`, `[1]` or `[num_classes]`.
    pub fn shape(&self) -> Vec<usize> {
        match self {
            Label::Int(_) => vec![],
            Label::Binary(_) => vec![1],
            Label::Categorical(v) => vec![v.len()],
        }
    }
}

/// Encoded labels of a whole batch, stored flat in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub enum LabelBatch {
    /// Shape `[batch]`.
    Int(Vec<i32>),
    /// Shape `[batch, 1]`.
    Binary(Vec<f32>),
    /// Shape `[batch, num_classes]`.
    Categorical { values: Vec<f32>, num_classes: usize },
}

impl LabelBatch {
    /// Number of samples in the batch.
    pub fn len(&self) -> usize {
        match self {
            LabelBatch::Int(v) => v.len(),
            LabelBatch::Binary(v) => v.len(),
            LabelBatch::Categorical {
                values,
                num_classes,
            } => values.len() / (*num_classes).max(1),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn shape(&self) -> Vec<usize> {
        match self {
            LabelBatch::Int(v) => vec![v.len()],
            LabelBatch::Binary(v) => vec![v.len(), 1],
            LabelBatch::Categorical { num_classes, .. } => vec![self.len(), *num_classes],
        }
    }

    /// Element type name of the batch array.
    pub fn dtype(&self) -> &'static str {
        match self {
            LabelBatch::Int(_) => "int32",
            _ => "float32",
        }
    }

    /// Row `i` of the batch as `f32` values.
    pub fn row(&self, i: usize) -> Vec<f32> {
        match self {
            LabelBatch::Int(v) => vec![v[i] as f32],
            LabelBatch::Binary(v) => vec![v[i]],
            LabelBatch::Categorical {
                values,
                num_classes,
            } => values[i * num_classes..(i + 1) * num_classes].to_vec(),
        }
    }
}

/// Encodes raw class indices according to a [`LabelMode`].
#[derive(Debug, Clone, Copy)]
pub struct LabelEncoder {
    pub mode: LabelMode,
    pub num_classes: usize,
}

impl LabelEncoder {
    pub fn new(mode: LabelMode, num_classes: usize) -> Self {
        Self { mode, num_classes }
    }

    fn one_hot_into(&self, class_idx: usize, out: &mut Vec<f32>) {
        let start = out.len();
        out.resize(start + self.num_classes, 0.0);
        if class_idx < self.num_classes {
            out[start + class_idx] = 1.0;
        }
    }

    pub fn encode(&self, class_idx: usize) -> Label {
        match self.mode {
            LabelMode::Int => Label::Int(class_idx as i32),
            LabelMode::Binary => Label::Binary(class_idx as f32),
            LabelMode::Categorical => {
                let mut one_hot = Vec::with_capacity(self.num_classes);
                self.one_hot_into(class_idx, &mut one_hot);
                Label::Categorical(one_hot)
            }
        }
    }

    pub fn encode_batch(&self, class_indices: &[usize]) -> LabelBatch {
        match self.mode {
            LabelMode::Int => LabelBatch::Int(class_indices.iter().map(|&c| c as i32).collect()),
            LabelMode::Binary => {
                LabelBatch::Binary(class_indices.iter().map(|&c| c as f32).collect())
            }
            LabelMode::Categorical => {
                let mut values = Vec::with_capacity(class_indices.len() * self.num_classes);
                for &c in class_indices {
                    self.one_hot_into(c, &mut values);
                }
                LabelBatch::Categorical {
                    values,
                    num_classes: self.num_classes,
                }
            }
        }
    }
}
