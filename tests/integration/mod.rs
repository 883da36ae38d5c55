/// Integration tests: the store over real slots, and the MCP server end to end
mod persistence_integration;
mod server_integration;
