pub mod entities;
pub mod errors;
pub mod row_serializer;
