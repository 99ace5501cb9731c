//! Two-slide presentation: a black title slide and a slide holding the
//! dashboard snapshot. Written as an uncompressed (stored) zip package.

use anyhow::{ensure, Result};

const EMU_PER_INCH: i64 = 914_400;
const SLIDE_W: i64 = 10 * EMU_PER_INCH;
const SLIDE_H: i64 = 7 * EMU_PER_INCH + EMU_PER_INCH / 2;

const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;
const XML_HEAD: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL_TYPE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const CT_PREFIX: &str = "application/vnd.openxmlformats-officedocument";

/// Minimal zip archive writer with stored entries and CRC32 checksums.
pub struct ZipWriter {
    out: Vec<u8>,
    central: Vec<u8>,
    entries: u16,
}

// 1980-01-01 00:00 in DOS format; keeps output byte-stable.
const DOS_TIME: u16 = 0;
const DOS_DATE: u16 = (1 << 5) | 1;

impl ZipWriter {
    pub fn new() -> Self {
        Self { out: Vec::new(), central: Vec::new(), entries: 0 }
    }

    pub fn add(&mut self, name: &str, data: &[u8]) -> Result<()> {
        ensure!(self.entries < u16::MAX, "too many zip entries");
        ensure!(data.len() < u32::MAX as usize, "zip entry too large: {name}");
        let crc = crc32fast::hash(data);
        let size = data.len() as u32;
        let offset = self.out.len() as u32;
        let name_len = name.len() as u16;

        let out = &mut self.out;
        out.extend_from_slice(&0x0403_4b50u32.to_le_bytes());
        out.extend_from_slice(&20u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&DOS_TIME.to_le_bytes());
        out.extend_from_slice(&DOS_DATE.to_le_bytes());
        out.extend_from_slice(&crc.to_le_bytes());
        out.extend_from_slice(&size.to_le_bytes());
        out.extend_from_slice(&size.to_le_bytes());
        out.extend_from_slice(&name_len.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(name.as_bytes());
        out.extend_from_slice(data);

        let cd = &mut self.central;
        cd.extend_from_slice(&0x0201_4b50u32.to_le_bytes());
        cd.extend_from_slice(&20u16.to_le_bytes());
        cd.extend_from_slice(&20u16.to_le_bytes());
        cd.extend_from_slice(&0u16.to_le_bytes());
        cd.extend_from_slice(&0u16.to_le_bytes());
        cd.extend_from_slice(&DOS_TIME.to_le_bytes());
        cd.extend_from_slice(&DOS_DATE.to_le_bytes());
        cd.extend_from_slice(&crc.to_le_bytes());
        cd.extend_from_slice(&size.to_le_bytes());
        cd.extend_from_slice(&size.to_le_bytes());
        cd.extend_from_slice(&name_len.to_le_bytes());
        cd.extend_from_slice(&[0u8; 12]);
        cd.extend_from_slice(&offset.to_le_bytes());
        cd.extend_from_slice(name.as_bytes());

        self.entries += 1;
        Ok(())
    }

    pub fn finish(mut self) -> Vec<u8> {
        let cd_offset = self.out.len() as u32;
        let cd_size = self.central.len() as u32;
        self.out.extend_from_slice(&self.central);
        self.out.extend_from_slice(&0x0605_4b50u32.to_le_bytes());
        self.out.extend_from_slice(&[0u8; 4]);
        self.out.extend_from_slice(&self.entries.to_le_bytes());
        self.out.extend_from_slice(&self.entries.to_le_bytes());
        self.out.extend_from_slice(&cd_size.to_le_bytes());
        self.out.extend_from_slice(&cd_offset.to_le_bytes());
        self.out.extend_from_slice(&0u16.to_le_bytes());
        self.out
    }
}

impl Default for ZipWriter {
    fn default() -> Self {
        Self::new()
    }
}

pub fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn rels(items: &[(&str, &str, &str)]) -> String {
    let mut body = format!(r#"{XML_HEAD}<Relationships xmlns="{REL_NS}">"#);
    for (id, kind, target) in items {
        body.push_str(&format!(
            r#"<Relationship Id="{id}" Type="{REL_TYPE}/{kind}" Target="{target}"/>"#
        ));
    }
    body.push_str("</Relationships>");
    body
}

fn content_types() -> String {
    let parts = [
        ("/ppt/presentation.xml", "presentationml.presentation.main+xml"),
        ("/ppt/slideMasters/slideMaster1.xml", "presentationml.slideMaster+xml"),
        ("/ppt/slideLayouts/slideLayout1.xml", "presentationml.slideLayout+xml"),
        ("/ppt/theme/theme1.xml", "theme+xml"),
        ("/ppt/slides/slide1.xml", "presentationml.slide+xml"),
        ("/ppt/slides/slide2.xml", "presentationml.slide+xml"),
    ];
    let mut body = format!(
        r#"{XML_HEAD}<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/>"#
    );
    for (part, kind) in parts {
        body.push_str(&format!(r#"<Override PartName="{part}" ContentType="{CT_PREFIX}.{kind}"/>"#));
    }
    body.push_str("</Types>");
    body
}

fn presentation() -> String {
    format!(
        r#"{XML_HEAD}<p:presentation {NS}><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst><p:sldId id="256" r:id="rId2"/><p:sldId id="257" r:id="rId3"/></p:sldIdLst><p:sldSz cx="{SLIDE_W}" cy="{SLIDE_H}"/><p:notesSz cx="{SLIDE_H}" cy="{SLIDE_W}"/></p:presentation>"#
    )
}

const EMPTY_TREE: &str = r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#;

fn slide_master() -> String {
    format!(
        r#"{XML_HEAD}<p:sldMaster {NS}><p:cSld><p:spTree>{EMPTY_TREE}</p:spTree></p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst></p:sldMaster>"#
    )
}

fn slide_layout() -> String {
    format!(
        r#"{XML_HEAD}<p:sldLayout {NS} type="blank" preserve="1"><p:cSld name="Blank"><p:spTree>{EMPTY_TREE}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#
    )
}

fn theme() -> String {
    let sys = |name: &str, val: &str| format!(r#"<a:{name}><a:srgbClr val="{val}"/></a:{name}>"#);
    let colors = [
        ("dk1", "000000"),
        ("lt1", "FFFFFF"),
        ("dk2", "1F1F1F"),
        ("lt2", "EEEEEE"),
        ("accent1", "0099FF"),
        ("accent2", "FF6633"),
        ("accent3", "663366"),
        ("accent4", "009966"),
        ("accent5", "CC9900"),
        ("accent6", "00CCFF"),
        ("hlink", "0066FF"),
        ("folHlink", "663366"),
    ];
    let scheme: String = colors.iter().map(|(n, v)| sys(n, v)).collect();
    let fill = r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#;
    let line = r#"<a:ln w="9525"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#;
    let effect = "<a:effectStyle><a:effectLst/></a:effectStyle>";
    let font = r#"<a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/>"#;
    format!(
        r#"{XML_HEAD}<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Wellboard"><a:themeElements><a:clrScheme name="Wellboard">{scheme}</a:clrScheme><a:fontScheme name="Wellboard"><a:majorFont>{font}</a:majorFont><a:minorFont>{font}</a:minorFont></a:fontScheme><a:fmtScheme name="Wellboard"><a:fillStyleLst>{fill}{fill}{fill}</a:fillStyleLst><a:lnStyleLst>{line}{line}{line}</a:lnStyleLst><a:effectStyleLst>{effect}{effect}{effect}</a:effectStyleLst><a:bgFillStyleLst>{fill}{fill}{fill}</a:bgFillStyleLst></a:fmtScheme></a:themeElements></a:theme>"#
    )
}

struct TextBox<'a> {
    id: u32,
    x: i64,
    y: i64,
    cx: i64,
    cy: i64,
    text: &'a str,
    size_pt: u32,
    color: &'a str,
}

impl TextBox<'_> {
    fn xml(&self) -> String {
        format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="TextBox {id}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr><p:txBody><a:bodyPr wrap="square"/><a:lstStyle/><a:p><a:pPr algn="ctr"/><a:r><a:rPr lang="en-US" sz="{sz}" b="1"><a:solidFill><a:srgbClr val="{color}"/></a:solidFill></a:rPr><a:t>{text}</a:t></a:r></a:p></p:txBody></p:sp>"#,
            id = self.id,
            x = self.x,
            y = self.y,
            cx = self.cx,
            cy = self.cy,
            sz = self.size_pt * 100,
            color = self.color,
            text = xml_escape(self.text),
        )
    }
}

fn title_slide(brand: &str) -> String {
    let title = format!("{brand} Production Kpis Report");
    let text = TextBox {
        id: 2,
        x: EMU_PER_INCH,
        y: EMU_PER_INCH / 10,
        cx: SLIDE_W - 2 * EMU_PER_INCH,
        cy: EMU_PER_INCH,
        text: &title,
        size_pt: 36,
        color: "FFFFFF",
    };
    format!(
        r#"{XML_HEAD}<p:sld {NS}><p:cSld><p:bg><p:bgPr><a:solidFill><a:srgbClr val="000000"/></a:solidFill><a:effectLst/></p:bgPr></p:bg><p:spTree>{EMPTY_TREE}{}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#,
        text.xml()
    )
}

fn snapshot_slide() -> String {
    let top = EMU_PER_INCH * 3 / 2;
    let height = EMU_PER_INCH * 11 / 2;
    let picture = format!(
        r#"<p:pic><p:nvPicPr><p:cNvPr id="2" name="Dashboard"/><p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="rId2"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr><a:xfrm><a:off x="0" y="{top}"/><a:ext cx="{SLIDE_W}" cy="{height}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#
    );
    let heading = TextBox {
        id: 3,
        x: 0,
        y: 0,
        cx: SLIDE_W,
        cy: EMU_PER_INCH,
        text: "KPIs Dashboard",
        size_pt: 48,
        color: "000000",
    };
    format!(
        r#"{XML_HEAD}<p:sld {NS}><p:cSld><p:spTree>{EMPTY_TREE}{picture}{}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#,
        heading.xml()
    )
}

pub fn build(brand: &str, snapshot_png: &[u8]) -> Result<Vec<u8>> {
    let layout_rel = ("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml");
    let mut zip = ZipWriter::new();
    zip.add("[Content_Types].xml", content_types().as_bytes())?;
    zip.add("_rels/.rels", rels(&[("rId1", "officeDocument", "ppt/presentation.xml")]).as_bytes())?;
    zip.add("ppt/presentation.xml", presentation().as_bytes())?;
    zip.add(
        "ppt/_rels/presentation.xml.rels",
        rels(&[
            ("rId1", "slideMaster", "slideMasters/slideMaster1.xml"),
            ("rId2", "slide", "slides/slide1.xml"),
            ("rId3", "slide", "slides/slide2.xml"),
            ("rId4", "theme", "theme/theme1.xml"),
        ])
        .as_bytes(),
    )?;
    zip.add("ppt/slideMasters/slideMaster1.xml", slide_master().as_bytes())?;
    zip.add(
        "ppt/slideMasters/_rels/slideMaster1.xml.rels",
        rels(&[layout_rel, ("rId2", "theme", "../theme/theme1.xml")]).as_bytes(),
    )?;
    zip.add("ppt/slideLayouts/slideLayout1.xml", slide_layout().as_bytes())?;
    zip.add(
        "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
        rels(&[("rId1", "slideMaster", "../slideMasters/slideMaster1.xml")]).as_bytes(),
    )?;
    zip.add("ppt/theme/theme1.xml", theme().as_bytes())?;
    zip.add("ppt/slides/slide1.xml", title_slide(brand).as_bytes())?;
    zip.add("ppt/slides/_rels/slide1.xml.rels", rels(&[layout_rel]).as_bytes())?;
    zip.add("ppt/slides/slide2.xml", snapshot_slide().as_bytes())?;
    zip.add(
        "ppt/slides/_rels/slide2.xml.rels",
        rels(&[layout_rel, ("rId2", "image", "../media/image1.png")]).as_bytes(),
    )?;
    zip.add("ppt/media/image1.png", snapshot_png)?;
    Ok(zip.finish())
}

/// Entry names in archive order, read back from the central directory.
pub fn entry_names(archive: &[u8]) -> Result<Vec<String>> {
    ensure!(archive.len() >= 22, "archive too short");
    let eocd = archive.len() - 22;
    ensure!(archive[eocd..eocd + 4] == 0x0605_4b50u32.to_le_bytes(), "missing end record");
    let count = u16::from_le_bytes([archive[eocd + 10], archive[eocd + 11]]) as usize;
    let mut pos = u32::from_le_bytes(archive[eocd + 16..eocd + 20].try_into()?) as usize;
    let mut names = Vec::with_capacity(count);
    for _ in 0..count {
        ensure!(pos + 46 <= archive.len(), "truncated central directory");
        ensure!(archive[pos..pos + 4] == 0x0201_4b50u32.to_le_bytes(), "bad central header");
        let name_len = u16::from_le_bytes([archive[pos + 28], archive[pos + 29]]) as usize;
        let extra = u16::from_le_bytes([archive[pos + 30], archive[pos + 31]]) as usize;
        let comment = u16::from_le_bytes([archive[pos + 32], archive[pos + 33]]) as usize;
        let start = pos + 46;
        ensure!(start + name_len <= archive.len(), "truncated entry name");
        names.push(String::from_utf8_lossy(&archive[start..start + name_len]).into_owned());
        pos = start + name_len + extra + comment;
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zip_layout() {
        let mut zip = ZipWriter::new();
        zip.add("a.txt", b"hello").unwrap();
        zip.add("dir/b.txt", b"").unwrap();
        let bytes = zip.finish();
        assert_eq!(&bytes[..4], b"PK\x03\x04");
        assert_eq!(&bytes[14..18], &crc32fast::hash(b"hello").to_le_bytes());
        assert_eq!(entry_names(&bytes).unwrap(), vec!["a.txt", "dir/b.txt"]);
    }

    #[test]
    fn presentation_has_two_slides_and_media() {
        let bytes = build("Acme & Co", b"\x89PNG fake").unwrap();
        let names = entry_names(&bytes).unwrap();
        assert!(names.iter().any(|n| n == "ppt/slides/slide1.xml"));
        assert!(names.iter().any(|n| n == "ppt/slides/slide2.xml"));
        assert!(names.iter().any(|n| n == "ppt/media/image1.png"));
        assert_eq!(names.iter().filter(|n| n.starts_with("ppt/slides/slide")).count(), 2);
    }

    #[test]
    fn title_slide_text() {
        let xml = title_slide("Acme & Co");
        assert!(xml.contains("Acme &amp; Co Production Kpis Report"));
        assert!(xml.contains(r#"sz="3600""#));
        assert!(xml.contains(r#"<a:srgbClr val="000000"/></a:solidFill><a:effectLst/>"#));
        let second = snapshot_slide();
        assert!(second.contains("KPIs Dashboard"));
        assert!(second.contains(&format!(r#"<a:off x="0" y="{}"/>"#, 1_371_600)));
    }
}
