mod directives;
mod executor;
