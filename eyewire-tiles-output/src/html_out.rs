use eyewire_tiles::{Layout, TaskAssignment};
use std::fs::File;
use std::io::{BufWriter, Write};

const STYLE: &str = "body { background: #111; color: #ccc; font-family: sans-serif; }
.imgContainer { display: grid; grid-template-columns: 128px 128px; margin: 8px 0; }
.imgContainer img { width: 128px; height: 128px; background: #222; }";

/// Writes `layout` as a standalone HTML page: one container per layer,
/// four images per container, filled images carrying their payload as `src`.
pub fn write_html<W: Write>(layout: &Layout, task: &TaskAssignment, mut w: W) -> std::io::Result<()> {
    let bounds = layout.bounds();
    writeln!(w, "<!DOCTYPE html>")?;
    writeln!(w, "<html>")?;
    writeln!(w, "<head>")?;
    writeln!(w, "<meta charset=\"utf-8\">")?;
    writeln!(w, "<title>Volume {}</title>", task.channel_id)?;
    writeln!(w, "<style>\n{}\n</style>", STYLE)?;
    writeln!(w, "</head>")?;
    writeln!(w, "<body>")?;
    writeln!(
        w,
        "<h1>Volume {} [{} to {}]</h1>",
        task.channel_id, bounds.min, bounds.max
    )?;
    writeln!(w, "<div id=\"mainContainer\">")?;

    for layer in layout.layers() {
        writeln!(
            w,
            "<div id=\"{}\" class=\"imgContainer\">",
            layer.container_id()
        )?;
        for key in &layer.slots {
            let id = key.element_id();
            match layout.get(key) {
                Some(data) => writeln!(
                    w,
                    "<img id=\"{}\" alt=\"{}\" src=\"{}\">",
                    id,
                    id,
                    escape_attr(data)
                )?,
                None => writeln!(w, "<img id=\"{}\" alt=\"{}\">", id, id)?,
            }
        }
        writeln!(w, "</div>")?;
    }

    writeln!(w, "</div>")?;
    writeln!(w, "</body>")?;
    writeln!(w, "</html>")?;
    Ok(())
}

pub fn layout_to_html(layout: &Layout, task: &TaskAssignment, filename: &str) -> anyhow::Result<()> {
    println!("Writing HTML page: {}", filename);
    let file = File::create(filename).map_err(|e| anyhow::anyhow!("File::create: {}", e))?;
    let mut writer = BufWriter::new(file);
    write_html(layout, task, &mut writer).map_err(|e| anyhow::anyhow!("write_html: {}", e))?;
    writer.flush()?;
    Ok(())
}

fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}
