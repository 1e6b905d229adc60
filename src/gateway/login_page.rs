//! Embedded login page, served on the public route and with every HTML 401

pub const LOGIN_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Solar Dashboard - Sign in</title>
    <style>
        * { box-sizing: border-box; margin: 0; padding: 0; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: #0f172a;
            color: #e2e8f0;
            min-height: 100vh;
            display: flex;
            align-items: center;
            justify-content: center;
        }
        form {
            background: #1e293b;
            padding: 2rem;
            border-radius: 8px;
            width: min(22rem, 90vw);
            display: flex;
            flex-direction: column;
            gap: 1rem;
        }
        h1 { font-size: 1.25rem; font-weight: 600; }
        input {
            padding: 0.6rem 0.75rem;
            border-radius: 4px;
            border: 1px solid #475569;
            background: #0f172a;
            color: inherit;
        }
        button {
            padding: 0.6rem;
            border: none;
            border-radius: 4px;
            background: #f59e0b;
            color: #0f172a;
            font-weight: 600;
            cursor: pointer;
        }
        .error { color: #f87171; font-size: 0.875rem; min-height: 1.2em; }
    </style>
</head>
<body>
    <form id="login">
        <h1>Solar Dashboard</h1>
        <input id="token" type="password" placeholder="Access token" autocomplete="current-password" required>
        <button type="submit">Sign in</button>
        <p class="error" id="error"></p>
    </form>
    <script>
        const SESSION_KEY = 'pwa_access_token';
        document.getElementById('login').addEventListener('submit', async (event) => {
            event.preventDefault();
            const token = document.getElementById('token').value.trim();
            const error = document.getElementById('error');
            error.textContent = '';
            try {
                const response = await fetch('/auth-check', {
                    headers: { 'Authorization': 'Bearer ' + token, 'Accept': 'application/json' }
                });
                if (response.ok) {
                    sessionStorage.setItem(SESSION_KEY, token);
                    document.cookie = SESSION_KEY + '=' + token + '; Path=/; SameSite=Strict';
                    window.location.replace('/');
                } else {
                    error.textContent = 'Invalid access token';
                }
            } catch (e) {
                error.textContent = 'Unable to reach the server';
            }
        });
    </script>
</body>
</html>
"#;
