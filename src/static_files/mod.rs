pub mod html_content;
