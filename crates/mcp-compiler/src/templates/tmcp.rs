// crates/mcp-compiler/src/templates/tmcp.rs
// Server program for the tmcp library

use super::{argument_pattern, handler_body, import_specifier, tool_imports};
use crate::context::{ProjectContext, Transport};
use crate::synthesize::{quote, synthesize_tool_schema};
use std::fmt::Write;

pub(super) fn render(context: &ProjectContext) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "import {{McpServer}} from 'tmcp';");
    let _ = writeln!(out, "import {{ZodJsonSchemaAdapter}} from '@tmcp/adapter-zod';");
    match context.transport {
        Transport::Stdio => {
            let _ = writeln!(out, "import {{StdioTransport}} from '@tmcp/transport-stdio';");
        }
        Transport::Http => {
            let _ = writeln!(out, "import {{HttpTransport}} from '@tmcp/transport-http';");
            let _ = writeln!(out, "import {{serve}} from 'srvx';");
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

    let _ = writeln!(out, "const server = new McpServer(");
    let _ = writeln!(out, "  {{");
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
    let _ = writeln!(out, "  }},");
    let _ = writeln!(out, "  {{");
    let _ = writeln!(out, "    adapter: new ZodJsonSchemaAdapter(),");
    let _ = writeln!(out, "    capabilities: {{");
    let _ = writeln!(out, "      tools: {{listChanged: true}}");
    let _ = writeln!(out, "    }}");
    let _ = writeln!(out, "  }}");
    let _ = writeln!(out, ");");

    for tool in &context.tools {
        out.push('\n');
        let _ = writeln!(out, "server.tool(");
        let _ = writeln!(out, "  {{");
        let _ = writeln!(out, "    name: {},", quote(&tool.name));
        let description = tool.description.as_deref().unwrap_or_default();
        if tool.parameters.is_empty() {
            let _ = writeln!(out, "    description: {}", quote(description));
            let _ = writeln!(out, "  }},");
            let _ = writeln!(out, "  async () => {{");
        } else {
            let _ = writeln!(out, "    description: {},", quote(description));
            let _ = writeln!(out, "    schema: {}", synthesize_tool_schema(tool));
            let _ = writeln!(out, "  }},");
            let _ = writeln!(out, "  async ({}) => {{", argument_pattern(tool));
        }
        out.push_str(&handler_body(tool, "    "));
        let _ = writeln!(out, "  }}");
        let _ = writeln!(out, ");");
    }
    out.push('\n');

    match context.transport {
        Transport::Stdio => {
            let _ = writeln!(out, "const transport = new StdioTransport(server);");
            let _ = writeln!(out, "transport.listen();");
        }
        Transport::Http => {
            let _ = writeln!(out, "const transport = new HttpTransport(server);");
            out.push('\n');
            let _ = writeln!(out, "serve({{");
            let _ = writeln!(out, "  async fetch(request) {{");
            let _ = writeln!(out, "    const response = await transport.respond(request);");
            let _ = writeln!(out, "    return response ?? new Response(null, {{status: 404}});");
            let _ = writeln!(out, "  }}");
            let _ = writeln!(out, "}});");
        }
    }

    out
}
