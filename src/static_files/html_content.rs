/// Default page for `/` when the served directory has no index.html.
pub fn landing_page() -> &'static str {
    r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>SDK Test Server</title>
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Arial, sans-serif;
            max-width: 800px;
            margin: 50px auto;
            padding: 20px;
            line-height: 1.6;
        }
        .card {
            border: 1px solid #ddd;
            border-radius: 8px;
            padding: 20px;
            margin: 20px 0;
            background: #f9f9f9;
        }
        .btn {
            display: inline-block;
            background: #007cba;
            color: white;
            padding: 10px 20px;
            text-decoration: none;
            border-radius: 5px;
            margin: 5px;
        }
        .btn:hover { background: #005a87; }
        .code {
            background: #f1f1f1;
            padding: 15px;
            border-radius: 5px;
            font-family: 'Courier New', monospace;
            font-size: 14px;
        }
    </style>
</head>
<body>
    <h1>SDK Test Server</h1>
    <p>Server running at http://127.0.0.1:3000</p>

    <div class="card">
        <h2>Available test pages</h2>
        <a href="/test-comprehensive.html" class="btn">Comprehensive test</a>
        <a href="/dwell-time-test.html" class="btn">Dwell-time test</a>
        <a href="/test.html" class="btn">Basic test</a>
    </div>

    <div class="card">
        <h2>Backend configuration</h2>
        <p>To pass CORS validation, add this origin to the backend's
           <code>ALLOWED_ORIGINS</code> environment variable:</p>
        <div class="code">http://127.0.0.1:3000</div>
        <p>The backend is expected at http://localhost:8080.</p>
    </div>
</body>
</html>
"#
}
