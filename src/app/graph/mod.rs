mod interaction;
mod scene;
mod view;

pub(in crate::app) use view::{OpenViewFn, OutlineGraphView};
