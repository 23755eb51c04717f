mod basic;
mod bulk;
mod in_memory;
mod scenario;
