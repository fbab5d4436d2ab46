mod interpreter;
mod properties;
