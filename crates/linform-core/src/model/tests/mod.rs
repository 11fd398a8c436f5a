mod builder_rows;
mod support;
