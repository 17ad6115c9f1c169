//! Example: Building a drawing from in-memory page documents
//!
//! This example assembles a package from page markup held in memory,
//! without reading a file, and prints both output documents.

use stencil::{DrawingProcessor, Package, config::AppConfig};

const PAGE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<PageContents xmlns="http://schemas.microsoft.com/office/visio/2012/main">
  <Shapes>
    <Shape ID="1" NameU="Process" Name="Process" Master="2">
      <Cell N="PinX" V="1.5"/>
      <Cell N="PinY" V="4"/>
      <Cell N="Width" V="1"/>
      <Cell N="Height" V="0.75"/>
      <Text>Client</Text>
    </Shape>
    <Shape ID="2" NameU="Process.2" Name="Process.2" Master="2">
      <Cell N="PinX" V="5.5"/>
      <Cell N="PinY" V="4"/>
      <Cell N="Width" V="1"/>
      <Cell N="Height" V="0.75"/>
      <Text>Server</Text>
    </Shape>
    <Shape ID="3" NameU="Dynamic connector" Name="Dynamic connector" Type="Shape" Master="5">
      <Cell N="BeginX" V="2"/>
      <Cell N="BeginY" V="4"/>
      <Cell N="EndX" V="5"/>
      <Cell N="EndY" V="4"/>
      <Text>request</Text>
    </Shape>
  </Shapes>
  <Connects>
    <Connect FromSheet="3" FromCell="BeginX" FromPart="9" ToSheet="1" ToCell="PinX" ToPart="3"/>
    <Connect FromSheet="3" FromCell="EndX" FromPart="12" ToSheet="2" ToCell="PinX" ToPart="3"/>
  </Connects>
</PageContents>"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Building drawing from in-memory pages...\n");

    // Package parts are addressed by their path inside the container
    let package = Package::from_parts([("visio/pages/page1.xml", PAGE)]);

    let processor = DrawingProcessor::new(AppConfig::default());
    let drawing = processor.process_package("in-memory", &package)?;

    println!(
        "Registered {} area shape(s) and {} line shape(s)",
        drawing.catalogue().areas().len(),
        drawing.catalogue().lines().len()
    );

    for edge in drawing.graph().edges() {
        println!(
            "Edge {} '{}': {} -> {}",
            edge.id(),
            edge.text(),
            edge.from_node_text().unwrap_or("?"),
            edge.to_node_text().unwrap_or("?")
        );
    }

    println!("\nCatalogue:\n{}", processor.render_catalogue(&drawing)?);
    println!("\nGraph:\n{}", processor.render_graph(&drawing)?);

    Ok(())
}
