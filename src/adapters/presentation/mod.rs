mod console;
mod html;

pub use console::ConsolePresenter;
pub use html::{HtmlPresenter, SURFACES};
