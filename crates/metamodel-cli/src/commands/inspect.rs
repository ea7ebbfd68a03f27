//! `metamodel inspect`: show what the programming model derived for a type.

use metamodel_core::application::{SpecificationInfo, services::MemberInfo};

use crate::{
    cli::InspectArgs, config::AppConfig, context::open_service, error::CliResult,
    output::OutputManager,
};

pub fn execute(args: InspectArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let service = open_service(&config)?;
    let info = service.describe(&args.type_name)?;

    if output.is_json() {
        output.json(&info)?;
        return Ok(());
    }

    for line in render(&info, args.facets) {
        match line {
            Line::Header(text) => output.header(&text)?,
            Line::Text(text) => output.print(&text)?,
            Line::Detail(text) => output.detail(&text)?,
            Line::Warning(text) => output.warning(&text)?,
        }
    }
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum Line {
    Header(String),
    Text(String),
    Detail(String),
    Warning(String),
}

fn render(info: &SpecificationInfo, with_facets: bool) -> Vec<Line> {
    let mut lines = vec![Line::Header(format!("{} ({})", info.type_name, info.kind))];

    lines.push(Line::Text(format!("  spec id:    {}", info.spec_id)));
    lines.push(Line::Text(format!("  title:      {}", info.title)));
    if let Some(plural) = &info.plural {
        lines.push(Line::Text(format!("  plural:     {plural}")));
    }
    if let Some(superclass) = &info.superclass {
        lines.push(Line::Text(format!("  extends:    {superclass}")));
    }
    if !info.interfaces.is_empty() {
        lines.push(Line::Text(format!("  implements: {}", info.interfaces.join(", "))));
    }
    if info.is_abstract {
        lines.push(Line::Text("  abstract".into()));
    }
    if with_facets {
        for facet in &info.facets {
            lines.push(Line::Detail(format!(
                "    {} = {} [{}]",
                facet.facet_type, facet.value, facet.precedence
            )));
        }
    }

    lines.push(Line::Header("Members".into()));
    if info.members.is_empty() {
        lines.push(Line::Text("  (none)".into()));
    }
    for member in &info.members {
        lines.push(Line::Text(member_line(member)));
        if with_facets {
            for facet in &member.facets {
                lines.push(Line::Detail(format!(
                    "      {} = {} [{}{}]",
                    facet.facet_type,
                    facet.value,
                    facet.precedence,
                    if facet.derived { ", derived" } else { "" }
                )));
            }
        }
        for parameter in &member.parameters {
            lines.push(Line::Detail(format!(
                "      param {}: {}",
                parameter.name, parameter.type_ref
            )));
        }
    }

    for orphan in &info.layout_orphans {
        lines.push(Line::Warning(format!("layout references unknown member: {orphan}")));
    }
    lines
}

fn member_line(member: &MemberInfo) -> String {
    let mut line = format!(
        "  {:<10} {:<20} {:<24} \"{}\"",
        member.feature, member.id, member.type_ref, member.name
    );
    if let Some(hidden) = &member.hidden {
        line.push_str(&format!("  hidden({hidden})"));
    }
    line
}
