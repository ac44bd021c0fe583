mod export;
mod integration;
