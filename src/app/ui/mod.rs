mod controls;
mod document;
