pub mod pursuit_tool;
