mod client;
mod properties;

pub use client::{ApiErrorClass, NotionClient, NotionError};
pub use properties::{
    MultiSelectProperty, PageProperties, REFERENCE_PROPERTY, RichTextObject, RichTextProperty,
    SelectOption, SelectProperty, TextContent, TitleProperty, UrlProperty,
};
