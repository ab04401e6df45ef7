mod common;
mod internships;
mod routing;
