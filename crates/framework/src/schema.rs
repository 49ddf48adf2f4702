//! Declarative request shapes checked by the validator.

/// Type of a single declared field.
#[derive(Clone, Debug)]
pub enum FieldType {
    String,
    Number,
    Integer,
    Boolean,
    Array(Box<FieldType>),
    Object(Shape),
}

impl FieldType {
    /// Name used in validation messages.
    pub(crate) fn expected(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Integer => "integer",
            FieldType::Boolean => "boolean",
            FieldType::Array(_) => "array",
            FieldType::Object(_) => "object",
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct FieldSpec {
    pub(crate) name: String,
    pub(crate) ty: FieldType,
    pub(crate) required: bool,
}

/// An ordered set of named fields. Unknown extra properties are allowed;
/// declaration order is the order errors are reported in.
#[derive(Clone, Debug, Default)]
pub struct Shape {
    pub(crate) fields: Vec<FieldSpec>,
}

impl Shape {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a required field.
    pub fn field(mut self, name: &str, ty: FieldType) -> Self {
        self.fields.push(FieldSpec { name: name.to_string(), ty, required: true });
        self
    }

    /// Declare an optional field.
    pub fn optional(mut self, name: &str, ty: FieldType) -> Self {
        self.fields.push(FieldSpec { name: name.to_string(), ty, required: false });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Per-section validation schema for a route. Absent sections pass trivially.
#[derive(Clone, Debug, Default)]
pub struct CtxSchema {
    pub body: Option<Shape>,
    pub params: Option<Shape>,
    pub query: Option<Shape>,
    pub headers: Option<Shape>,
}

impl CtxSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body(mut self, shape: Shape) -> Self {
        self.body = Some(shape);
        self
    }

    pub fn params(mut self, shape: Shape) -> Self {
        self.params = Some(shape);
        self
    }

    pub fn query(mut self, shape: Shape) -> Self {
        self.query = Some(shape);
        self
    }

    pub fn headers(mut self, shape: Shape) -> Self {
        self.headers = Some(shape);
        self
    }
}
