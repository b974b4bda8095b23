//! HTML pages for the upload forms and OCR results.

/// Escape HTML special characters to prevent XSS attacks.
pub(crate) fn html_escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

const STYLE: &str = r#"
        * {
            margin: 0;
            padding: 0;
            box-sizing: border-box;
        }
        body {
            background: #0f0f0f;
            color: #fff;
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, sans-serif;
            padding: 32px;
        }
        h1 {
            font-size: 20px;
            font-weight: 600;
            margin-bottom: 24px;
        }
        .panel {
            background: rgba(255, 255, 255, 0.05);
            border: 1px solid rgba(255, 255, 255, 0.1);
            border-radius: 8px;
            padding: 16px 20px;
            margin-bottom: 20px;
            max-width: 640px;
        }
        .panel h2 {
            font-size: 14px;
            font-weight: 600;
            margin-bottom: 12px;
        }
        label {
            display: block;
            font-size: 12px;
            color: rgba(255, 255, 255, 0.7);
            margin: 8px 0 4px;
        }
        input[type=number] {
            width: 96px;
        }
        button {
            margin-top: 12px;
            background: rgba(99, 102, 241, 0.8);
            color: #fff;
            border: none;
            border-radius: 4px;
            padding: 6px 14px;
            cursor: pointer;
        }
        textarea {
            width: 100%;
            min-height: 240px;
            background: #1a1a1a;
            color: #fff;
            border: 1px solid rgba(255, 255, 255, 0.15);
            border-radius: 4px;
            padding: 8px;
            font-family: ui-monospace, monospace;
        }
        .error-banner {
            background: rgba(220, 38, 38, 0.95);
            color: white;
            padding: 12px 20px;
            border-radius: 6px;
            font-size: 14px;
            margin-bottom: 20px;
            max-width: 640px;
        }
        .muted {
            color: rgba(255, 255, 255, 0.6);
            font-size: 13px;
        }
        a {
            color: #818cf8;
        }
"#;

fn layout(title: &str, body: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{STYLE}</style>
</head>
<body>
{body}
</body>
</html>
"##,
        title = html_escape(title),
    )
}

/// Build the `accept` attribute for file inputs, e.g. `.png,.jpg`.
fn accept_attribute(extensions: &[String]) -> String {
    extensions
        .iter()
        .map(|ext| format!(".{}", ext))
        .collect::<Vec<_>>()
        .join(",")
}

/// Landing page with the split and OCR forms.
pub fn index_page(extensions: &[String]) -> String {
    let accept = html_escape(&accept_attribute(extensions));
    let allowed = html_escape(&extensions.join(", "));

    let body = format!(
        r##"    <h1>Image Splitter</h1>
    <div class="panel">
        <h2>Split into tiles</h2>
        <form action="/split" method="post" enctype="multipart/form-data">
            <label for="split-file">Image</label>
            <input id="split-file" type="file" name="file" accept="{accept}" required>
            <label for="rows">Rows</label>
            <input id="rows" type="number" name="rows" min="1" value="2" required>
            <label for="cols">Columns</label>
            <input id="cols" type="number" name="cols" min="1" value="2" required>
            <div><button type="submit">Split and download</button></div>
        </form>
    </div>
    <div class="panel">
        <h2>Extract text</h2>
        <form action="/ocr" method="post" enctype="multipart/form-data">
            <label for="ocr-file">Image</label>
            <input id="ocr-file" type="file" name="file" accept="{accept}" required>
            <div><button type="submit">Run OCR</button></div>
        </form>
    </div>
    <p class="muted">Accepted formats: {allowed}</p>"##
    );

    layout("Image Splitter", &body)
}

/// Page shown for a failed request.
pub fn error_page(message: &str) -> String {
    let body = format!(
        r##"    <h1>Image Splitter</h1>
    <div class="error-banner">{}</div>
    <p><a href="/">Back</a></p>"##,
        html_escape(message)
    );

    layout("Error - Image Splitter", &body)
}

/// OCR result page with a form that posts the text to `/download_text`.
pub fn ocr_result_page(text: &str) -> String {
    let content = if text.is_empty() {
        r#"<p class="muted">No text detected in the image.</p>"#.to_string()
    } else {
        format!(
            r##"<form action="/download_text" method="post">
            <textarea name="text" readonly>{}</textarea>
            <div><button type="submit">Download as .txt</button></div>
        </form>"##,
            html_escape(text)
        )
    };

    let body = format!(
        r##"    <h1>Extracted text</h1>
    <div class="panel">
        {content}
    </div>
    <p><a href="/">Back</a></p>"##
    );

    layout("OCR Result - Image Splitter", &body)
}
