// crates/mcp-compiler/src/templates/mcp.rs
// Server program for the official @modelcontextprotocol/sdk

use super::{argument_pattern, handler_body, import_specifier, tool_imports};
use crate::context::{ProjectContext, Transport};
use crate::synthesize::{property_key, quote, synthesize_parameter};
use std::fmt::Write;

/// Port used when `PORT` is unset
const DEFAULT_HTTP_PORT: u16 = 3000;

pub(super) fn render(context: &ProjectContext) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "import {{McpServer}} from '@modelcontextprotocol/sdk/server/mcp.js';");
    match context.transport {
        Transport::Stdio => {
            let _ = writeln!(
                out,
                "import {{StdioServerTransport}} from '@modelcontextprotocol/sdk/server/stdio.js';"
            );
        }
        Transport::Http => {
            let _ = writeln!(
                out,
                "import {{StreamableHTTPServerTransport}} from '@modelcontextprotocol/sdk/server/streamableHttp.js';"
            );
            let _ = writeln!(out, "import {{createServer}} from 'node:http';");
        }
    }
    let _ = writeln!(out, "import * as z from 'zod';");
    if !context.tools.is_empty() {
        let _ = writeln!(
            out,
            "import {{{}}} from '{}';",
            tool_imports(context),
            import_specifier(&context.source_file_path, &context.output_file_path)
        );
    }
    out.push('\n');

    // a fresh server per connection, stateless HTTP needs one per request
    let _ = writeln!(out, "function createMcpServer() {{");
    let _ = writeln!(out, "  const server = new McpServer({{");
    let _ = writeln!(out, "    name: {},", quote(&context.name));
    match &context.description {
        Some(description) => {
            let _ = writeln!(out, "    version: {},", quote(&context.version));
            let _ = writeln!(out, "    description: {}", quote(description));
        }
        None => {
            let _ = writeln!(out, "    version: {}", quote(&context.version));
        }
    }
    let _ = writeln!(out, "  }});");

    for tool in &context.tools {
        out.push('\n');
        let _ = writeln!(out, "  server.registerTool(");
        let _ = writeln!(out, "    {},", quote(&tool.name));

        let mut config = Vec::new();
        if let Some(description) = &tool.description {
            config.push(format!("      description: {}", quote(description)));
        }
        if !tool.parameters.is_empty() {
            let shape = tool
                .parameters
                .iter()
                .map(|p| format!("        {}: {}", property_key(&p.name), synthesize_parameter(p)))
                .collect::<Vec<_>>()
                .join(",\n");
            config.push(format!("      inputSchema: {{\n{}\n      }}", shape));
        }
        if config.is_empty() {
            let _ = writeln!(out, "    {{}},");
        } else {
            let _ = writeln!(out, "    {{\n{}\n    }},", config.join(",\n"));
        }

        if tool.parameters.is_empty() {
            let _ = writeln!(out, "    async () => {{");
        } else {
            let _ = writeln!(out, "    async ({}) => {{", argument_pattern(tool));
        }
        out.push_str(&handler_body(tool, "      "));
        let _ = writeln!(out, "    }}");
        let _ = writeln!(out, "  );");
    }

    out.push('\n');
    let _ = writeln!(out, "  return server;");
    let _ = writeln!(out, "}}");
    out.push('\n');

    match context.transport {
        Transport::Stdio => {
            let _ = writeln!(out, "const server = createMcpServer();");
            let _ = writeln!(out, "await server.connect(new StdioServerTransport());");
        }
        Transport::Http => {
            let _ = writeln!(out, "createServer(async (req, res) => {{");
            let _ = writeln!(out, "  const server = createMcpServer();");
            let _ = writeln!(
                out,
                "  const transport = new StreamableHTTPServerTransport({{sessionIdGenerator: undefined}});"
            );
            let _ = writeln!(out, "  res.on('close', () => {{");
            let _ = writeln!(out, "    transport.close();");
            let _ = writeln!(out, "    server.close();");
            let _ = writeln!(out, "  }});");
            let _ = writeln!(out, "  await server.connect(transport);");
            let _ = writeln!(out, "  await transport.handleRequest(req, res);");
            let _ = writeln!(
                out,
                "}}).listen(Number(process.env.PORT ?? {}));",
                DEFAULT_HTTP_PORT
            );
        }
    }

    out
}
