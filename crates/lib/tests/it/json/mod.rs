mod editable;
mod lookup;
mod merge;
