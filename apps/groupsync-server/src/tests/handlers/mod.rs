mod groups;
mod members;
mod syncables;
